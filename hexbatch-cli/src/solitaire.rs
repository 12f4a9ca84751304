//! Solitaire command - random agent against a built-in opponent
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_solitaire()
//! - Level 3: tally()
//! - Level 4: formatting

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use hexbatch_core::{Agent, EnvConfig, LazyAgent, Player, RandomAgent, Solitaire, SolitaireTransition};

use crate::env_args::EnvArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OpponentKind {
    /// Always the first legal cell
    Lazy,
    /// Uniformly random legal cell
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SeatArg {
    Black,
    White,
}

impl From<SeatArg> for Player {
    fn from(seat: SeatArg) -> Self {
        match seat {
            SeatArg::Black => Player::Black,
            SeatArg::White => Player::White,
        }
    }
}

#[derive(Args)]
pub struct SolitaireArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Built-in opponent
    #[arg(long, value_enum, default_value = "random")]
    pub opponent: OpponentKind,

    /// Seat played by the random agent
    #[arg(long, value_enum, default_value = "black")]
    pub seat: SeatArg,

    /// Agent moves per instance
    #[arg(long, default_value = "200")]
    pub steps: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct SolitaireResults {
    wins: usize,
    losses: usize,
}

impl SolitaireResults {
    fn total(&self) -> usize {
        self.wins + self.losses
    }

    fn win_rate(&self) -> f32 {
        if self.total() == 0 {
            0.0
        } else {
            self.wins as f32 / self.total() as f32
        }
    }
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SolitaireArgs, seed: Option<u64>) -> Result<()> {
    let config = args.env.to_config(EnvConfig::new(64, 11))?;
    let seat = Player::from(args.seat);

    tracing::info!(
        "Starting solitaire: agent plays {:?} against {:?} opponent, {} envs",
        seat,
        args.opponent,
        config.batch_size
    );

    // Opponent seed is offset so it never mirrors the agent's stream
    let opponent_seed = seed.map(|s| s.wrapping_add(1));
    let results = match args.opponent {
        OpponentKind::Lazy => play_solitaire(config, seat, LazyAgent, args.steps, seed)?,
        OpponentKind::Random => {
            play_solitaire(config, seat, RandomAgent::new(opponent_seed), args.steps, seed)?
        }
    };

    if args.json {
        print_json_results(&results, seat, args.opponent);
    } else {
        print_text_results(&results, seat, args.opponent);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_solitaire<O: Agent>(
    config: EnvConfig,
    seat: Player,
    opponent: O,
    steps: usize,
    seed: Option<u64>,
) -> Result<SolitaireResults> {
    let mut env = Solitaire::create(config, seat, opponent).context("Failed to create environment")?;
    let mut agent = RandomAgent::new(seed);
    let mut results = SolitaireResults::default();

    let mut obs = env.observe();
    for _ in 0..steps {
        let actions = agent.select_actions(&obs.instances);
        let (transition, next) = env.step(&actions).context("Step failed")?;
        tally(&transition, &mut results);
        obs = next;
    }

    Ok(results)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn tally(transition: &SolitaireTransition, results: &mut SolitaireResults) {
    for (&terminal, &reward) in transition.terminal.iter().zip(&transition.rewards) {
        if !terminal {
            continue;
        }
        if reward > 0.0 {
            results.wins += 1;
        } else {
            results.losses += 1;
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_results(results: &SolitaireResults, seat: Player, opponent: OpponentKind) {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        seat: String,
        opponent: String,
        games: usize,
        wins: usize,
        losses: usize,
        win_rate: f32,
    }

    let output = JsonOutput {
        seat: format!("{:?}", seat),
        opponent: format!("{:?}", opponent),
        games: results.total(),
        wins: results.wins,
        losses: results.losses,
        win_rate: results.win_rate(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &SolitaireResults, seat: Player, opponent: OpponentKind) {
    println!("\n=== Solitaire Results ===");
    println!("Agent seat:  {:?}", seat);
    println!("Opponent:    {:?}", opponent);
    println!("Games:       {}", results.total());
    println!("Wins:        {} ({:.1}%)", results.wins, results.win_rate() * 100.0);
    println!("Losses:      {}", results.losses);
}

// ============================================================================
// TESTS
// ============================================================================
