//! Environment configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::MAX_BOARDSIZE;
use crate::error::{HexError, Result};

/// Default board edge, as in most Hex tournaments
pub const DEFAULT_BOARDSIZE: usize = 11;

/// Shape and execution options for a [`crate::BatchedEnv`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Number of independent game instances
    pub batch_size: usize,
    /// Board edge length shared by every instance
    pub boardsize: usize,
    /// Step instances on the rayon thread pool
    pub parallel: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            boardsize: DEFAULT_BOARDSIZE,
            parallel: false,
        }
    }
}

impl EnvConfig {
    /// Config for `batch_size` instances on a `boardsize` board
    pub fn new(batch_size: usize, boardsize: usize) -> Self {
        Self {
            batch_size,
            boardsize,
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_boardsize(mut self, boardsize: usize) -> Self {
        self.boardsize = boardsize;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(HexError::InvalidConfig("batch_size must be positive".to_string()));
        }
        if self.boardsize == 0 || self.boardsize > MAX_BOARDSIZE {
            return Err(HexError::InvalidConfig(format!(
                "boardsize must be in 1..={}, got {}",
                MAX_BOARDSIZE, self.boardsize
            )));
        }
        Ok(())
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EnvConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}
