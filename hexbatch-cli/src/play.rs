//! Play command - batched random self-play
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: record_step(), compute_statistics()
//! - Level 4: progress bar, formatting

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use hexbatch_core::{Agent, BatchedEnv, EnvConfig, Player, RandomAgent, Transition};

use crate::env_args::EnvArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub env: EnvArgs,

    /// Number of finished games to collect
    #[arg(long, default_value = "1000")]
    pub games: usize,

    /// Print instance 0 after every step
    #[arg(long)]
    pub render: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// A finished game
#[derive(Clone, Copy, Debug, PartialEq)]
struct GameRecord {
    winner: Player,
    moves: usize,
}

/// Aggregated self-play results
#[derive(Clone, Debug)]
struct PlayResults {
    games: Vec<GameRecord>,
    black_wins: usize,
    white_wins: usize,
    avg_moves: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the batch
/// 2. Step random moves until enough games have finished
/// 3. Report win rates
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = args.env.to_config(EnvConfig::new(64, 11))?;

    tracing::info!(
        "Starting self-play: {} games over {} envs, boardsize {}",
        args.games,
        config.batch_size,
        config.boardsize
    );

    let games = play_games(config, &args, seed)?;
    let results = compute_statistics(games);

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Step the whole batch until `args.games` games have finished
fn play_games(config: EnvConfig, args: &PlayArgs, seed: Option<u64>) -> Result<Vec<GameRecord>> {
    let mut env = BatchedEnv::create(config).context("Failed to create environment")?;
    let mut agent = RandomAgent::new(seed);
    let mut lengths = vec![0usize; env.batch_size()];
    let mut games = Vec::with_capacity(args.games);
    let progress = progress_bar(args.games as u64, args.json)?;

    let mut obs = env.observe();
    while games.len() < args.games {
        let actions = agent.select_actions(&obs.instances);
        let (transition, next) = env.step(&actions).context("Step failed")?;
        let before = games.len();
        record_step(&transition, &mut lengths, &mut games);
        progress.inc((games.len() - before) as u64);

        if args.render {
            progress.suspend(|| -> Result<()> {
                println!("{}\n", env.render(0)?);
                Ok(())
            })?;
        }
        obs = next;
    }
    progress.finish_and_clear();

    games.truncate(args.games);
    Ok(games)
}

/// Report self-play results
fn report_results(results: &PlayResults, args: &PlayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Count the move for every instance and close out the ones that finished
fn record_step(transition: &Transition, lengths: &mut [usize], games: &mut Vec<GameRecord>) {
    for (i, length) in lengths.iter_mut().enumerate() {
        *length += 1;
        if !transition.terminal[i] {
            continue;
        }
        let winner = if transition.rewards[i][Player::Black.seat()] > 0.0 {
            Player::Black
        } else {
            Player::White
        };
        tracing::debug!("Instance {}: {:?} wins in {} moves", i, winner, length);
        games.push(GameRecord { winner, moves: *length });
        *length = 0;
    }
}

/// Compute aggregate statistics from game records
fn compute_statistics(games: Vec<GameRecord>) -> PlayResults {
    let black_wins = games.iter().filter(|g| g.winner == Player::Black).count();
    let white_wins = games.len() - black_wins;
    let total_moves: usize = games.iter().map(|g| g.moves).sum();
    let avg_moves = if games.is_empty() {
        0.0
    } else {
        total_moves as f32 / games.len() as f32
    };

    PlayResults {
        games,
        black_wins,
        white_wins,
        avg_moves,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>7}/{len:<7} games  {elapsed_precise}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

fn win_rate(wins: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        wins as f32 / total as f32
    }
}

/// Print results as JSON
fn print_json_results(results: &PlayResults) {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        black_wins: usize,
        white_wins: usize,
        black_win_rate: f32,
        avg_moves: f32,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        black_wins: results.black_wins,
        white_wins: results.white_wins,
        black_win_rate: win_rate(results.black_wins, total),
        avg_moves: results.avg_moves,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &PlayResults) {
    let total = results.games.len();

    println!("\n=== Self-Play Results ===");
    println!("Total games: {}", total);
    println!(
        "Black wins:  {} ({:.1}%)",
        results.black_wins,
        win_rate(results.black_wins, total) * 100.0
    );
    println!(
        "White wins:  {} ({:.1}%)",
        results.white_wins,
        win_rate(results.white_wins, total) * 100.0
    );
    println!("Avg moves:   {:.1}", results.avg_moves);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_step_closes_finished_games() {
        let transition = Transition {
            terminal: vec![false, true, true],
            rewards: vec![[0.0, 0.0], [1.0, -1.0], [-1.0, 1.0]],
        };
        let mut lengths = vec![2, 4, 6];
        let mut games = Vec::new();
        record_step(&transition, &mut lengths, &mut games);

        assert_eq!(lengths, vec![3, 0, 0]);
        assert_eq!(
            games,
            vec![
                GameRecord { winner: Player::Black, moves: 5 },
                GameRecord { winner: Player::White, moves: 7 },
            ]
        );
    }

    #[test]
    fn test_compute_statistics() {
        let games = vec![
            GameRecord { winner: Player::Black, moves: 5 },
            GameRecord { winner: Player::Black, moves: 7 },
            GameRecord { winner: Player::White, moves: 6 },
        ];
        let results = compute_statistics(games);
        assert_eq!(results.black_wins, 2);
        assert_eq!(results.white_wins, 1);
        assert!((results.avg_moves - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_play_games_collects_requested_count() {
        let args = PlayArgs {
            env: EnvArgs {
                config: None,
                envs: None,
                boardsize: None,
                parallel: false,
            },
            games: 10,
            render: false,
            json: true,
        };
        let games = play_games(EnvConfig::new(4, 3), &args, Some(9)).unwrap();
        assert_eq!(games.len(), 10);
        // 3x3 games need at least 5 moves and never more than 9
        assert!(games.iter().all(|g| (5..=9).contains(&g.moves)));
    }

    #[test]
    fn test_win_rate_empty() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(win_rate(1, 4), 0.25);
    }
}
