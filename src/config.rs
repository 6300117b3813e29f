//! Editor configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file (or
//! no file at all) gives a working editor.
//!
//! ```
//! use move_tree_editor::config::EditorConfig;
//!
//! let config = EditorConfig::from_toml_str(r#"
//!     undo_limit = 20
//!     auto_queen = false
//! "#).unwrap();
//!
//! assert_eq!(config.undo_limit, 20);
//! assert!(!config.auto_queen);
//! assert_eq!(config.log_filter, "info");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chess;

/// Default number of undo snapshots kept
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots; older ones are dropped
    pub undo_limit: usize,

    /// Starting position for new games; standard start when unset
    pub start_fen: Option<String>,

    /// Promote to a queen when a promotion move names no piece
    pub auto_queen: bool,

    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: DEFAULT_UNDO_LIMIT,
            start_fen: None,
            auto_queen: true,
            log_filter: "info".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Like [`EditorConfig::load`], but a missing file gives the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_undo_limit(mut self, limit: usize) -> Self {
        self.undo_limit = limit;
        self
    }

    pub fn with_start_fen(mut self, fen: impl Into<String>) -> Self {
        self.start_fen = Some(fen.into());
        self
    }

    /// Starting FEN for new games
    pub fn start_fen(&self) -> &str {
        self.start_fen.as_deref().unwrap_or(chess::START_FEN)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_limit == 0 {
            return Err(ConfigError::Invalid("undo_limit must be at least 1".to_string()));
        }
        if let Some(fen) = &self.start_fen {
            chess::parse_position(fen).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(())
    }
}
