//! Chess game-record editor.
//!
//! A game is a tree of moves: the main line plus nested variations. The
//! editor appends moves, branches variations, promotes, deletes and
//! truncates them, and keeps a bounded undo/redo history of snapshots.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod models;

pub use config::EditorConfig;
pub use domain::{GameTree, MoveId, MoveRecord};
pub use error::{Error, Result};
pub use models::{Editor, GameState};
