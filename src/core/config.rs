/// Presentation tuning, loadable from RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("reveal interval must be greater than zero")]
    ZeroInterval,
}

fn default_reveal_interval_ms() -> u64 {
    20
}

fn default_skip_hint() -> String {
    "Press ENTER to continue...".to_string()
}

/// How text is revealed to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Delay between two revealed characters.
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
    /// Shown beneath a fully revealed line.
    #[serde(default = "default_skip_hint")]
    pub skip_hint: String,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            reveal_interval_ms: default_reveal_interval_ms(),
            skip_hint: default_skip_hint(),
        }
    }
}

impl PresentationConfig {
    pub fn load_from_ron(path: &Path) -> Result<PresentationConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<PresentationConfig, ConfigError> {
        let config: PresentationConfig = ron::from_str(input)?;
        if config.reveal_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(config)
    }

    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}
