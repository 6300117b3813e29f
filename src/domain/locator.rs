//! Read-only recursive search over a move tree.
//!
//! Every function tolerates an empty tree and an unknown id by returning
//! `None` (or the documented fallback) instead of panicking. Search order is
//! depth-first: a move is checked, then each of its variations in order,
//! before the next move of the same line.

use crate::domain::move_record::{Line, MoveId, MoveRecord};

/// One step from a line into one of its variations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch {
    /// Index of the move holding the variation in the enclosing line
    pub index: usize,
    /// Index of the variation in that move's `variations`
    pub variation: usize,
}

/// Structural address of a line: the branch steps taken from the main line.
/// An empty path is the main line itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinePath(Vec<Branch>);

impl LinePath {
    pub fn main_line() -> Self {
        Self::default()
    }

    pub fn is_main_line(&self) -> bool {
        self.0.is_empty()
    }

    /// Variation nesting depth (0 for the main line)
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.0
    }

    /// The enclosing line and the branch step leading from it into this one
    pub fn split_last(&self) -> Option<(LinePath, Branch)> {
        let (last, rest) = self.0.split_last()?;
        Some((LinePath(rest.to_vec()), *last))
    }
}

/// Where a move lives: its line and its index in that line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: LinePath,
    pub index: usize,
}

/// Find the location of the move with `id`
pub fn locate(line: &[MoveRecord], id: MoveId) -> Option<Location> {
    let mut path = Vec::new();
    let index = locate_in(line, id, &mut path)?;
    Some(Location { line: LinePath(path), index })
}

fn locate_in(line: &[MoveRecord], id: MoveId, path: &mut Vec<Branch>) -> Option<usize> {
    for (index, mv) in line.iter().enumerate() {
        if mv.id == id {
            return Some(index);
        }
        for (variation, moves) in mv.variations.iter().enumerate() {
            path.push(Branch { index, variation });
            if let Some(found) = locate_in(moves, id, path) {
                return Some(found);
            }
            path.pop();
        }
    }
    None
}

/// Resolve a line address
pub fn line_at<'a>(main_line: &'a [MoveRecord], path: &LinePath) -> Option<&'a [MoveRecord]> {
    let mut line = main_line;
    for step in path.branches() {
        line = line.get(step.index)?.variations.get(step.variation)?.as_slice();
    }
    Some(line)
}

pub(crate) fn line_at_mut<'a>(main_line: &'a mut Line, path: &LinePath) -> Option<&'a mut Line> {
    let mut line = main_line;
    for step in path.branches() {
        line = line.get_mut(step.index)?.variations.get_mut(step.variation)?;
    }
    Some(line)
}

/// Depth-first search for a move by id
pub fn find_by_id(line: &[MoveRecord], id: MoveId) -> Option<&MoveRecord> {
    for mv in line {
        if mv.id == id {
            return Some(mv);
        }
        for variation in &mv.variations {
            if let Some(found) = find_by_id(variation, id) {
                return Some(found);
            }
        }
    }
    None
}

pub(crate) fn find_by_id_mut(line: &mut [MoveRecord], id: MoveId) -> Option<&mut MoveRecord> {
    for mv in line.iter_mut() {
        if mv.id == id {
            return Some(mv);
        }
        for variation in mv.variations.iter_mut() {
            if let Some(found) = find_by_id_mut(variation, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Membership in the top-level array only; this is what separates the main
/// line from variations.
pub fn is_in_main_line(main_line: &[MoveRecord], id: MoveId) -> bool {
    main_line.iter().any(|mv| mv.id == id)
}

/// The move whose `variations` hold the line containing `id`.
/// `None` for main-line moves and unknown ids.
pub fn find_parent_of_variation(main_line: &[MoveRecord], id: MoveId) -> Option<&MoveRecord> {
    let location = locate(main_line, id)?;
    let (enclosing, branch) = location.line.split_last()?;
    line_at(main_line, &enclosing)?.get(branch.index)
}

/// First move of the line containing `target`, or `target` itself when it
/// cannot be found.
pub fn find_first_move_of_line<'a>(
    main_line: &'a [MoveRecord],
    target: &'a MoveRecord,
) -> &'a MoveRecord {
    if is_in_main_line(main_line, target.id) {
        return main_line.first().unwrap_or(target);
    }
    locate(main_line, target.id)
        .and_then(|location| line_at(main_line, &location.line))
        .and_then(|line| line.first())
        .unwrap_or(target)
}

/// `start` followed by every later move of its own line.
/// Falls back to `[start]` when `start` cannot be found.
pub fn build_forward_line<'a>(
    main_line: &'a [MoveRecord],
    start: &'a MoveRecord,
) -> &'a [MoveRecord] {
    locate(main_line, start.id)
        .and_then(|location| {
            line_at(main_line, &location.line).map(|line| &line[location.index..])
        })
        .unwrap_or(std::slice::from_ref(start))
}
