//! Environment options shared by every command

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexbatch_core::EnvConfig;

#[derive(Args, Clone, Debug)]
pub struct EnvArgs {
    /// Environment config JSON; flags below override its fields
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of parallel game instances
    #[arg(long)]
    pub envs: Option<usize>,

    /// Board edge length
    #[arg(long)]
    pub boardsize: Option<usize>,

    /// Step instances on the rayon thread pool
    #[arg(long)]
    pub parallel: bool,
}

impl EnvArgs {
    /// Resolve into a validated config, starting from `defaults`
    pub fn to_config(&self, defaults: EnvConfig) -> Result<EnvConfig> {
        let mut config = match &self.config {
            Some(path) => EnvConfig::load(path)
                .with_context(|| format!("Failed to load env config: {}", path.display()))?,
            None => defaults,
        };
        if let Some(envs) = self.envs {
            config.batch_size = envs;
        }
        if let Some(boardsize) = self.boardsize {
            config.boardsize = boardsize;
        }
        if self.parallel {
            config.parallel = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = EnvArgs {
            config: None,
            envs: Some(16),
            boardsize: None,
            parallel: true,
        };
        let config = args.to_config(EnvConfig::new(4, 9)).unwrap();
        assert_eq!(config, EnvConfig::new(16, 9).with_parallel(true));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = EnvArgs {
            config: None,
            envs: Some(0),
            boardsize: None,
            parallel: false,
        };
        assert!(args.to_config(EnvConfig::default()).is_err());
    }
}
