//! Error types for the simulation core

use crate::board::Pos;

/// Why a move was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IllegalReason {
    /// The target cell already holds a stone
    Occupied,
    /// The target lies outside the board
    OutOfRange,
}

impl std::fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalReason::Occupied => f.write_str("cell is occupied"),
            IllegalReason::OutOfRange => f.write_str("cell is off the board"),
        }
    }
}

/// Contract violations surfaced by the environment.
///
/// None of these are retryable: every variant means the caller passed input
/// that the legality mask or the batch shape already ruled out.
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    #[error("illegal move in instance {instance} at action {action}: {reason}")]
    IllegalMove {
        instance: usize,
        action: usize,
        reason: IllegalReason,
    },

    #[error("shape mismatch: expected {expected} {what}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("instance {index} out of range for batch of {batch_size}")]
    InstanceOutOfRange { index: usize, batch_size: usize },

    #[error("cannot parse board at line {line}: {reason}")]
    ParseBoard { line: usize, reason: String },
}

impl HexError {
    pub(crate) fn illegal(instance: usize, action: usize, reason: IllegalReason) -> Self {
        HexError::IllegalMove {
            instance,
            action,
            reason,
        }
    }

    pub(crate) fn off_board(instance: usize, pos: Pos, boardsize: usize) -> Self {
        let action = pos.row.saturating_mul(boardsize).saturating_add(pos.col);
        Self::illegal(instance, action, IllegalReason::OutOfRange)
    }
}

pub type Result<T> = std::result::Result<T, HexError>;
