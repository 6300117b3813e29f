pub mod editor;
pub mod game;
pub mod undo;

pub use editor::{Action, Editor};
pub use game::{EditAction, GameState, Navigation};
pub use undo::{ActionTag, UndoHistory};
