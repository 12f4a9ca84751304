//! HEXBATCH Core - Batched Hex simulation engine
//!
//! This crate provides the game core for self-play and evaluation loops:
//! - Nine-valued cell model with edge-connection flags
//! - Incremental connectivity propagation (no full-board win search)
//! - Move application with in-place reset of finished games
//! - Seat-relative observations where the mover always plays "Black"
//! - A batch orchestrator stepping thousands of games per call

pub mod agent;
pub mod batch;
pub mod board;
pub mod canonical;
pub mod cell;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod game;
pub mod observe;
pub mod solitaire;

// Re-exports for convenient access
pub use agent::{Agent, LazyAgent, RandomAgent};
pub use batch::{BatchedEnv, Transition};
pub use board::{Board, Pos, MAX_BOARDSIZE, NEIGHBOURS};
pub use canonical::{from_canonical, to_canonical};
pub use cell::{color_of, connection_flags, is_edge, CellState, Player, Side, Sides};
pub use config::{EnvConfig, DEFAULT_BOARDSIZE};
pub use connectivity::Flood;
pub use error::{HexError, IllegalReason, Result};
pub use game::{GameInstance, MoveOutcome};
pub use observe::{observe, InstanceObservation, Observation};
pub use solitaire::{Solitaire, SolitaireTransition};
