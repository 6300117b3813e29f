//! Move tree data structure for representing chess games with variations.
//!
//! The tree is the main line; every move may carry alternative lines, which
//! nest arbitrarily. This is a pure domain module with no I/O.

use serde::{Deserialize, Serialize};

use crate::domain::linker::link_line;
use crate::domain::locator;
use crate::domain::move_record::{BLOCK_SIZE, Line, MoveId, MoveRecord};

/// A game record: the main line with nested variations
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTree {
    main_line: Line,
}

impl GameTree {
    /// Create an empty tree (start position, no moves)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a main line and link it
    pub fn from_main_line(main_line: Line) -> Self {
        let mut tree = Self { main_line };
        tree.link();
        tree
    }

    /// Recompute every `next`/`previous` link
    pub fn link(&mut self) {
        link_line(&mut self.main_line, None);
    }

    pub fn main_line(&self) -> &[MoveRecord] {
        &self.main_line
    }

    pub(crate) fn main_line_mut(&mut self) -> &mut Line {
        &mut self.main_line
    }

    /// Copy of the tree with all links cleared.
    ///
    /// Mutators start from this so no stale link survives a splice; tests use
    /// it to compare structure while ignoring links.
    pub fn unlinked(&self) -> GameTree {
        let mut copy = self.clone();
        for mv in copy.main_line.iter_mut() {
            mv.clear_links();
        }
        copy
    }

    /// Check if the tree has no moves at all
    pub fn is_empty(&self) -> bool {
        self.main_line.is_empty()
    }

    /// Total number of moves, variations included
    pub fn len(&self) -> usize {
        self.moves().len()
    }

    /// Get a move by id, searching every variation
    pub fn find(&self, id: MoveId) -> Option<&MoveRecord> {
        locator::find_by_id(&self.main_line, id)
    }

    pub fn contains(&self, id: MoveId) -> bool {
        self.find(id).is_some()
    }

    /// Check if a move sits in the main line array
    pub fn is_on_main_line(&self, id: MoveId) -> bool {
        locator::is_in_main_line(&self.main_line, id)
    }

    /// All moves in pre-order: each move, then its variations, then the next
    /// move of the same line
    pub fn moves(&self) -> Vec<&MoveRecord> {
        fn walk<'a>(line: &'a [MoveRecord], out: &mut Vec<&'a MoveRecord>) {
            for mv in line {
                out.push(mv);
                for variation in &mv.variations {
                    walk(variation, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.main_line, &mut out);
        out
    }

    pub fn first_move(&self) -> Option<&MoveRecord> {
        self.main_line.first()
    }

    pub fn last_main_line_move(&self) -> Option<&MoveRecord> {
        self.main_line.last()
    }

    pub fn max_id(&self) -> Option<MoveId> {
        self.moves().into_iter().map(|mv| mv.id).max()
    }

    /// First id of a block no move uses yet
    pub fn next_variation_id(&self) -> MoveId {
        let block = self.max_id().map_or(1, |id| id.block() + 1).max(1);
        MoveId::new(block * BLOCK_SIZE)
    }

    /// Id for a move appended right after `previous` in its line: the next
    /// id of the same block, or a fresh block when that id is taken or the
    /// block is exhausted.
    pub fn next_id_after(&self, previous: MoveId) -> MoveId {
        match previous.successor() {
            Some(id) if !self.contains(id) => id,
            _ => self.next_variation_id(),
        }
    }
}
