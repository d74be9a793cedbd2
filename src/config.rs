//! Node configuration.

use crate::entry::AgentId;
use connect_four_rules::BoardSize;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for one peer.
///
/// ```toml
/// agent = "alice"
/// log_filter = "info"
///
/// [board]
/// width = 7
/// height = 6
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Agent this node acts for.
    #[serde(default = "default_agent")]
    agent: AgentId,

    /// Board size for games this node creates.
    #[serde(default)]
    board: BoardSize,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_agent() -> AgentId {
    AgentId::new("player")
}

#[instrument]
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            agent: default_agent(),
            board: BoardSize::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl NodeConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(agent = %config.agent, board = %config.board, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if !config.board.is_playable() {
            return Err(ConfigError::new(format!(
                "Board size {} is not playable (sides must be {}..={})",
                config.board,
                BoardSize::MIN_SIDE,
                BoardSize::MAX_SIDE
            )));
        }
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            debug!("No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Replaces the agent, e.g. from the command line.
    pub fn with_agent(mut self, agent: AgentId) -> Self {
        self.agent = agent;
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = NodeConfig::from_toml("").unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(*config.board(), BoardSize::STANDARD);
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_unplayable_board_rejected() {
        let err = NodeConfig::from_toml("[board]\nwidth = 2\nheight = 6\n").unwrap_err();
        assert!(err.message.contains("not playable"));
    }

    #[test]
    fn test_error_records_location() {
        let err = NodeConfig::from_toml("agent = [").unwrap_err();
        assert!(err.message.starts_with("Failed to parse config"));
        assert!(err.file.ends_with("config.rs"));
    }
}
