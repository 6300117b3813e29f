pub mod chess;
pub mod edit;
pub mod linker;
pub mod locator;
pub mod move_record;
pub mod move_tree;
pub mod pgn;

pub use chess::{MoveOracle, MoveRequest, PlayedMove, START_FEN, ShakmatyOracle};
pub use edit::Edit;
pub use locator::{Branch, LinePath, Location};
pub use move_record::{BLOCK_SIZE, Line, MoveId, MoveRecord};
pub use move_tree::GameTree;
pub use pgn::{PgnGame, PgnHeaders};
