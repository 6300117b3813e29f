//! Bounded undo/redo history of state snapshots.

use std::collections::VecDeque;
use std::fmt;
use std::time::SystemTime;

use crate::config::DEFAULT_UNDO_LIMIT;

/// Which kind of action produced a history entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionTag {
    AddMove,
    AddVariation,
    Promote,
    DeleteVariation,
    DeleteRemaining,
    LoadPgn,
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionTag::AddMove => "add move",
            ActionTag::AddVariation => "add variation",
            ActionTag::Promote => "promote variation",
            ActionTag::DeleteVariation => "delete variation",
            ActionTag::DeleteRemaining => "delete remaining moves",
            ActionTag::LoadPgn => "load PGN",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct UndoEntry<S> {
    pub snapshot: S,
    pub action: ActionTag,
    pub timestamp: SystemTime,
}

impl<S> UndoEntry<S> {
    fn new(snapshot: S, action: ActionTag) -> Self {
        Self {
            snapshot,
            action,
            timestamp: SystemTime::now(),
        }
    }
}

/// Past and future snapshots around the live state.
///
/// The live state itself is never stored here: `undo` and `redo` take it and
/// hand back the snapshot that replaces it.
#[derive(Clone, Debug)]
pub struct UndoHistory<S> {
    past: VecDeque<UndoEntry<S>>,
    future: Vec<UndoEntry<S>>,
    limit: usize,
}

impl<S> Default for UndoHistory<S> {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl<S> UndoHistory<S> {
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Remember the state from before `action`. Clears the redo stack.
    pub fn record(&mut self, prior: S, action: ActionTag) {
        self.push_past(UndoEntry::new(prior, action));
        self.future.clear();
    }

    /// Step back: `current` moves onto the redo stack and the latest past
    /// snapshot is returned
    pub fn undo(&mut self, current: S) -> Option<S> {
        let entry = self.past.pop_back()?;
        self.future.push(UndoEntry::new(current, entry.action));
        Some(entry.snapshot)
    }

    /// Step forward again after an undo
    pub fn redo(&mut self, current: S) -> Option<S> {
        let entry = self.future.pop()?;
        self.push_past(UndoEntry::new(current, entry.action));
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Action that `undo` would revert
    pub fn last_action(&self) -> Option<ActionTag> {
        self.past.back().map(|entry| entry.action)
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, entry: UndoEntry<S>) {
        self.past.push_back(entry);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}
