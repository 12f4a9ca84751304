//! Batched environment
//!
//! Owns every game instance and is the only thing that mutates them. One
//! call to [`BatchedEnv::step`] takes one canonical action per instance,
//! applies them, resets finished games in place and returns the transition
//! together with the next observation.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos};
use crate::canonical::action_to_pos;
use crate::cell::Player;
use crate::config::EnvConfig;
use crate::connectivity::Flood;
use crate::error::{HexError, IllegalReason, Result};
use crate::game::{GameInstance, MoveOutcome};
use crate::observe::{observe, Observation};

/// Per-instance results of one step
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub terminal: Vec<bool>,
    /// `[instance][seat]`: +1 to the winner, -1 to the loser, else 0
    pub rewards: Vec<[f32; 2]>,
}

impl Transition {
    fn with_capacity(n: usize) -> Self {
        Self {
            terminal: Vec::with_capacity(n),
            rewards: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, mover: Player, outcome: MoveOutcome) {
        let mut reward = [0.0; 2];
        if outcome.terminal {
            reward[mover.seat()] = 1.0;
            reward[mover.opponent().seat()] = -1.0;
        }
        self.terminal.push(outcome.terminal);
        self.rewards.push(reward);
    }

    /// Number of instances that finished this step
    pub fn finished(&self) -> usize {
        self.terminal.iter().filter(|&&t| t).count()
    }
}

/// Fixed-size batch of independent Hex games
#[derive(Clone, Debug)]
pub struct BatchedEnv {
    config: EnvConfig,
    instances: Vec<GameInstance>,
    flood: Flood,
}

impl BatchedEnv {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a batch of empty games, Black to move everywhere
    pub fn create(config: EnvConfig) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            batch_size = config.batch_size,
            boardsize = config.boardsize,
            parallel = config.parallel,
            "creating batched environment"
        );
        let instances = (0..config.batch_size)
            .map(|_| GameInstance::new(config.boardsize))
            .collect();
        Ok(Self {
            config,
            instances,
            flood: Flood::new(),
        })
    }

    /// Sequential batch of `batch_size` games on a `boardsize` board
    pub fn new(batch_size: usize, boardsize: usize) -> Result<Self> {
        Self::create(EnvConfig::new(batch_size, boardsize))
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn batch_size(&self) -> usize {
        self.instances.len()
    }

    pub fn boardsize(&self) -> usize {
        self.config.boardsize
    }

    pub fn instances(&self) -> &[GameInstance] {
        &self.instances
    }

    pub fn instance(&self, index: usize) -> Result<&GameInstance> {
        self.instances.get(index).ok_or(HexError::InstanceOutOfRange {
            index,
            batch_size: self.instances.len(),
        })
    }

    pub fn seats(&self) -> Vec<Player> {
        self.instances.iter().map(|g| g.seat()).collect()
    }

    /// Replace one instance's position, e.g. to start from a fixture
    pub fn load_board(&mut self, index: usize, board: Board, seat: Player) -> Result<()> {
        if board.size() != self.boardsize() {
            return Err(HexError::ShapeMismatch {
                what: "boardsize",
                expected: self.boardsize(),
                actual: board.size(),
            });
        }
        let batch_size = self.instances.len();
        let slot = self
            .instances
            .get_mut(index)
            .ok_or(HexError::InstanceOutOfRange { index, batch_size })?;
        *slot = GameInstance::from_board(board, seat);
        Ok(())
    }

    // ========================================================================
    // OBSERVATION
    // ========================================================================

    /// Canonical view of every instance
    pub fn observe(&self) -> Observation {
        let instances = if self.config.parallel {
            self.instances.par_iter().map(observe).collect()
        } else {
            self.instances.iter().map(observe).collect()
        };
        Observation {
            boardsize: self.boardsize(),
            instances,
        }
    }

    /// Text dump of one instance's true board
    pub fn render(&self, index: usize) -> Result<String> {
        let game = self.instance(index)?;
        let seat = match game.seat() {
            Player::Black => "black",
            Player::White => "white",
        };
        Ok(format!("{} to move\n{}", seat, game.board().render()))
    }

    // ========================================================================
    // STEPPING
    // ========================================================================

    /// Apply one canonical action per instance
    pub fn step(&mut self, actions: &[usize]) -> Result<(Transition, Observation)> {
        let masked: Vec<Option<usize>> = actions.iter().copied().map(Some).collect();
        self.step_masked(&masked)
    }

    /// Apply one canonical `(row, col)` action per instance
    pub fn step_positions(&mut self, actions: &[Pos]) -> Result<(Transition, Observation)> {
        let n = self.boardsize();
        let mut linear = Vec::with_capacity(actions.len());
        for (i, pos) in actions.iter().enumerate() {
            if !pos.is_valid(n) {
                return Err(HexError::off_board(i, *pos, n));
            }
            linear.push(pos.index(n));
        }
        self.step(&linear)
    }

    /// Apply actions to the instances whose entry is `Some`.
    ///
    /// Skipped instances keep their board and seat and report a
    /// non-terminal, zero-reward transition. Every action is validated before
    /// any instance changes, so an error leaves the whole batch untouched.
    pub fn step_masked(&mut self, actions: &[Option<usize>]) -> Result<(Transition, Observation)> {
        let moves = self.resolve(actions)?;

        let outcomes = if self.config.parallel {
            self.apply_parallel(&moves)
        } else {
            self.apply_lockstep(&moves)
        };

        let mut transition = Transition::with_capacity(moves.len());
        for (mv, outcome) in moves.iter().zip(outcomes) {
            let outcome = outcome.unwrap_or_default();
            let mover = mv.map(|(_, p)| p).unwrap_or(Player::Black);
            if outcome.terminal {
                tracing::trace!(winner = ?mover, "game finished, instance reset");
            }
            transition.push(mover, outcome);
        }

        Ok((transition, self.observe()))
    }

    /// Translate canonical actions to true positions and check legality
    fn resolve(&self, actions: &[Option<usize>]) -> Result<Vec<Option<(Pos, Player)>>> {
        if actions.len() != self.instances.len() {
            return Err(HexError::ShapeMismatch {
                what: "actions",
                expected: self.instances.len(),
                actual: actions.len(),
            });
        }

        let n = self.boardsize();
        self.instances
            .iter()
            .zip(actions)
            .enumerate()
            .map(|(i, (game, action))| match *action {
                None => Ok(None),
                Some(a) if a >= n * n => Err(HexError::illegal(i, a, IllegalReason::OutOfRange)),
                Some(a) => {
                    let pos = action_to_pos(game.seat(), a, n);
                    game.check(pos).map_err(|reason| HexError::illegal(i, a, reason))?;
                    Ok(Some((pos, game.seat())))
                }
            })
            .collect()
    }

    /// Place every stone, flood all boards together, then resolve wins
    fn apply_lockstep(&mut self, moves: &[Option<(Pos, Player)>]) -> Vec<Option<MoveOutcome>> {
        let mut placed = Vec::with_capacity(moves.len());
        let mut seeds = Vec::with_capacity(moves.len());
        for (i, (game, mv)) in self.instances.iter_mut().zip(moves).enumerate() {
            placed.push(mv.map(|(pos, _)| {
                seeds.push((i, pos));
                game.place(pos)
            }));
        }

        self.flood.propagate(self.instances.as_mut_slice(), &seeds);

        self.instances
            .iter_mut()
            .zip(placed)
            .map(|(game, state)| state.map(|s| game.finish(s)))
            .collect()
    }

    /// Apply each instance's move independently on the thread pool
    fn apply_parallel(&mut self, moves: &[Option<(Pos, Player)>]) -> Vec<Option<MoveOutcome>> {
        self.instances
            .par_iter_mut()
            .zip(moves.par_iter())
            .map_init(Flood::new, |flood, (game, mv)| {
                mv.map(|(pos, _)| {
                    let placed = game.place(pos);
                    flood.propagate(std::slice::from_mut(game), &[(0, pos)]);
                    game.finish(placed)
                })
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
