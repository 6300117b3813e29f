//! Crate error type.
//!
//! Tree edits never fail; errors come from the collaborators around the
//! tree: the move oracle, PGN import and configuration.

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("illegal move {request} in position {fen}")]
    IllegalMove { request: String, fen: String },

    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("cannot parse move {0:?}")]
    InvalidMove(String),

    #[error("PGN error near token {token}: {reason}")]
    Pgn { token: usize, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
