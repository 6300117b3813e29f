//! Structural edits of a move tree.
//!
//! Every operation is copy-on-write: it clones the input without links,
//! splices the clone, relinks it and returns it. `None` means nothing
//! happened (unknown current move, nothing to branch from, ...); the caller
//! keeps its input untouched.

use tracing::debug;

use crate::domain::locator::{self, Location};
use crate::domain::move_record::{MoveId, MoveRecord};
use crate::domain::move_tree::GameTree;

/// Result of a successful edit: the new tree and the new current move
#[derive(Clone, Debug, PartialEq)]
pub struct Edit {
    pub tree: GameTree,
    pub current: Option<MoveId>,
}

impl Edit {
    fn linked(mut tree: GameTree, current: Option<MoveId>) -> Self {
        tree.link();
        Self { tree, current }
    }
}

/// Append `new_move` to the end of the line holding `current`.
///
/// With no current move the result is a main line of just `new_move`.
pub fn append_move(tree: &GameTree, current: Option<MoveId>, new_move: MoveRecord) -> Option<Edit> {
    let new_id = new_move.id;
    let Some(current) = current else {
        return Some(Edit::linked(GameTree::from_main_line(vec![new_move]), Some(new_id)));
    };

    let mut edited = tree.unlinked();
    if tree.is_on_main_line(current) {
        edited.main_line_mut().push(new_move);
    } else {
        let Some(location) = locator::locate(tree.main_line(), current) else {
            debug!(%current, "append_move: current move not in tree");
            return None;
        };
        let Some(line) = locator::line_at_mut(edited.main_line_mut(), &location.line) else {
            debug!(%current, "append_move: line of current move not found");
            return None;
        };
        line.push(new_move);
    }
    Some(Edit::linked(edited, Some(new_id)))
}

/// Add `new_move` as a one-move variation of the move following `current`.
///
/// The new line goes last in that move's `variations`. At the start position
/// the first main-line move is the one being replaced.
pub fn insert_variation(
    tree: &GameTree,
    current: Option<MoveId>,
    new_move: MoveRecord,
) -> Option<Edit> {
    let target = match current {
        Some(id) => {
            let Some(mv) = tree.find(id) else {
                debug!(%id, "insert_variation: current move not in tree");
                return None;
            };
            let Some(next) = mv.next() else {
                debug!(%id, "insert_variation: no next move to branch from");
                return None;
            };
            next
        }
        None => {
            let Some(first) = tree.first_move() else {
                debug!("insert_variation: empty tree has no move to branch from");
                return None;
            };
            first.id
        }
    };

    let new_id = new_move.id;
    let mut edited = tree.unlinked();
    let Some(holder) = locator::find_by_id_mut(edited.main_line_mut(), target) else {
        debug!(%target, "insert_variation: next move not in tree");
        return None;
    };
    holder.variations.push(vec![new_move]);
    Some(Edit::linked(edited, Some(new_id)))
}

/// Swap the variation holding `current` with the line it is an alternative to.
///
/// The variation's first move takes the place of its parent move, followed by
/// the rest of the variation. The parent's forward line (parent and every
/// later move of the enclosing line) becomes the last variation of the
/// promoted first move, after any sibling variations the parent held, so
/// promoting it back restores the previous shape.
pub fn promote_variation(tree: &GameTree, current: MoveId) -> Option<Edit> {
    let Some(Location { line, .. }) = locator::locate(tree.main_line(), current) else {
        debug!(%current, "promote_variation: current move not in tree");
        return None;
    };
    let Some((enclosing, branch)) = line.split_last() else {
        debug!(%current, "promote_variation: already on the main line");
        return None;
    };

    let mut edited = tree.unlinked();
    let parent_line = match locator::line_at_mut(edited.main_line_mut(), &enclosing) {
        Some(line) if branch.index < line.len() => line,
        _ => {
            debug!(%current, "promote_variation: enclosing line not found");
            return None;
        }
    };

    let mut demoted = parent_line.split_off(branch.index);
    let mut promoted = demoted[0].variations.remove(branch.variation);
    let siblings = std::mem::take(&mut demoted[0].variations);

    let first = &mut promoted[0];
    first.variations.extend(siblings);
    first.variations.push(demoted);
    parent_line.extend(promoted);

    Some(Edit::linked(edited, Some(current)))
}

/// Remove the whole variation holding `current`. The parent move becomes
/// current. Main-line moves cannot be deleted this way.
pub fn delete_variation(tree: &GameTree, current: MoveId) -> Option<Edit> {
    if tree.is_on_main_line(current) {
        debug!(%current, "delete_variation: main line cannot be deleted");
        return None;
    }
    let Some(Location { line, .. }) = locator::locate(tree.main_line(), current) else {
        debug!(%current, "delete_variation: current move not in tree");
        return None;
    };
    let (Some((enclosing, branch)), Some(parent)) = (
        line.split_last(),
        locator::find_parent_of_variation(tree.main_line(), current),
    ) else {
        debug!(%current, "delete_variation: parent move not found");
        return None;
    };
    let parent = parent.id;

    let mut edited = tree.unlinked();
    let holder = locator::line_at_mut(edited.main_line_mut(), &enclosing)
        .and_then(|parent_line| parent_line.get_mut(branch.index));
    let Some(holder) = holder.filter(|h| branch.variation < h.variations.len()) else {
        debug!(%current, "delete_variation: variation not found");
        return None;
    };
    holder.variations.remove(branch.variation);

    Some(Edit::linked(edited, Some(parent)))
}

/// Drop every move after `current` in its own line, along with all the
/// variations hanging off the dropped moves. `current` keeps its own
/// variations.
pub fn truncate_remaining(tree: &GameTree, current: MoveId) -> Option<Edit> {
    let Some(Location { line, index }) = locator::locate(tree.main_line(), current) else {
        debug!(%current, "truncate_remaining: current move not in tree");
        return None;
    };
    let len = locator::line_at(tree.main_line(), &line).map_or(0, <[MoveRecord]>::len);
    if index + 1 >= len {
        debug!(%current, "truncate_remaining: nothing after current move");
        return None;
    }

    let mut edited = tree.unlinked();
    let Some(own_line) = locator::line_at_mut(edited.main_line_mut(), &line) else {
        debug!(%current, "truncate_remaining: line of current move not found");
        return None;
    };
    own_line.truncate(index + 1);
    Some(Edit::linked(edited, Some(current)))
}
