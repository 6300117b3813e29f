//! Game state model: an immutable move tree plus the current-move pointer.
//!
//! Transitions are pure: they return a new [`GameState`] or `None` when the
//! action would change nothing. The tree sits behind an `Arc`, so the undo
//! history can hold many snapshots cheaply.

use std::sync::Arc;

use shakmaty::Color;

use crate::domain::chess;
use crate::domain::edit::{self, Edit};
use crate::domain::pgn::{PgnGame, PgnHeaders};
use crate::domain::{GameTree, MoveId, MoveRecord};
use crate::error::Result;
use crate::models::undo::ActionTag;

/// Tree-changing actions; each one is undoable
#[derive(Clone, Debug, PartialEq)]
pub enum EditAction {
    AppendMove(MoveRecord),
    InsertVariation(MoveRecord),
    PromoteVariation,
    DeleteVariation,
    TruncateRemaining,
    LoadGame(Box<GameState>),
}

impl EditAction {
    pub fn tag(&self) -> ActionTag {
        match self {
            EditAction::AppendMove(_) => ActionTag::AddMove,
            EditAction::InsertVariation(_) => ActionTag::AddVariation,
            EditAction::PromoteVariation => ActionTag::Promote,
            EditAction::DeleteVariation => ActionTag::DeleteVariation,
            EditAction::TruncateRemaining => ActionTag::DeleteRemaining,
            EditAction::LoadGame(_) => ActionTag::LoadPgn,
        }
    }
}

/// Moves of the current pointer; never undoable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    GotoMove(MoveId),
    /// Start position
    First,
    /// Last move of the main line
    Last,
    Next,
    Previous,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub tree: Arc<GameTree>,
    /// `None` is the start position
    pub current: Option<MoveId>,
    pub headers: PgnHeaders,
    pub start_fen: String,
    start_ply: u32,
}

impl GameState {
    /// Empty game from the given start position
    pub fn new(start_fen: &str) -> Result<Self> {
        Ok(Self {
            tree: Arc::new(GameTree::new()),
            current: None,
            headers: PgnHeaders::new(),
            start_fen: start_fen.to_string(),
            start_ply: chess::ply_before(start_fen)?,
        })
    }

    /// Game loaded from PGN, positioned at the start
    pub fn from_pgn(game: PgnGame) -> Result<Self> {
        let mut state = Self::new(&game.start_fen)?;
        state.tree = Arc::new(game.tree);
        state.headers = game.headers;
        Ok(state)
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    pub fn current_move(&self) -> Option<&MoveRecord> {
        self.current.and_then(|id| self.tree.find(id))
    }

    /// Position after the current move, or the start position
    pub fn current_fen(&self) -> &str {
        self.current_move()
            .map_or(self.start_fen.as_str(), |mv| mv.fen_after.as_str())
    }

    pub fn side_to_move(&self) -> Result<Color> {
        chess::side_to_move(self.current_fen())
    }

    /// Ply a move played from the current position gets
    pub fn next_ply(&self) -> u32 {
        self.current_move().map_or(self.start_ply, |mv| mv.ply) + 1
    }

    /// Move following the current one: its `next`, or the first main-line
    /// move at the start position
    pub fn next_move(&self) -> Option<&MoveRecord> {
        match self.current {
            None => self.tree.first_move(),
            Some(id) => self.tree.find(id)?.next().and_then(|next| self.tree.find(next)),
        }
    }

    fn with_edit(&self, edit: Edit) -> GameState {
        GameState {
            tree: Arc::new(edit.tree),
            current: edit.current,
            ..self.clone()
        }
    }

    fn with_current(&self, current: Option<MoveId>) -> Option<GameState> {
        if current == self.current {
            return None;
        }
        Some(GameState {
            current,
            ..self.clone()
        })
    }

    /// Apply a tree edit; `None` when it is a no-op
    pub fn edit(&self, action: &EditAction) -> Option<GameState> {
        let tree = self.tree.as_ref();
        let edit = match action {
            EditAction::AppendMove(mv) => edit::append_move(tree, self.current, mv.clone()),
            EditAction::InsertVariation(mv) => {
                edit::insert_variation(tree, self.current, mv.clone())
            }
            EditAction::PromoteVariation => edit::promote_variation(tree, self.current?),
            EditAction::DeleteVariation => edit::delete_variation(tree, self.current?),
            EditAction::TruncateRemaining => edit::truncate_remaining(tree, self.current?),
            EditAction::LoadGame(state) => return Some(state.as_ref().clone()),
        };
        edit.map(|edit| self.with_edit(edit))
    }

    /// Move the current pointer; `None` when it would not move
    pub fn navigate(&self, navigation: Navigation) -> Option<GameState> {
        let target = match navigation {
            Navigation::GotoMove(id) => Some(self.tree.find(id)?.id),
            Navigation::First => None,
            Navigation::Last => Some(self.tree.last_main_line_move()?.id),
            Navigation::Next => Some(self.next_move()?.id),
            Navigation::Previous => self.current_move()?.previous(),
        };
        self.with_current(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chess::{MoveOracle, ShakmatyOracle};
    use crate::domain::pgn::read_pgn;

    fn sample() -> GameState {
        let game = read_pgn(
            "1. e4 e5 (1... c5 2. Nf3) 2. Nf3 Nc6 *",
            &ShakmatyOracle::default(),
        )
        .unwrap();
        GameState::from_pgn(game).unwrap()
    }

    fn at(state: &GameState, id: u32) -> GameState {
        state.navigate(Navigation::GotoMove(MoveId::new(id))).unwrap()
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(chess::START_FEN).unwrap();
        assert!(state.tree.is_empty());
        assert_eq!(state.current, None);
        assert_eq!(state.current_fen(), chess::START_FEN);
        assert_eq!(state.side_to_move().unwrap(), Color::White);
        assert_eq!(state.next_ply(), 1);
        assert!(GameState::new("garbage").is_err());
    }

    #[test]
    fn test_navigation() {
        let state = sample();
        assert_eq!(state.navigate(Navigation::First), None);
        assert_eq!(state.navigate(Navigation::Previous), None);

        let next = state.navigate(Navigation::Next).unwrap();
        assert_eq!(next.current, Some(MoveId::new(0)));

        let last = state.navigate(Navigation::Last).unwrap();
        assert_eq!(last.current, Some(MoveId::new(3)));
        assert_eq!(last.navigate(Navigation::Next), None);
        assert_eq!(last.navigate(Navigation::Last), None);

        let c5 = at(&state, 1000);
        assert_eq!(c5.navigate(Navigation::Previous).unwrap().current, Some(MoveId::new(0)));
        assert_eq!(c5.navigate(Navigation::Next).unwrap().current, Some(MoveId::new(1001)));

        let e4 = at(&state, 0);
        assert_eq!(e4.navigate(Navigation::Previous).unwrap().current, None);
        assert_eq!(state.navigate(Navigation::GotoMove(MoveId::new(77))), None);
    }

    #[test]
    fn test_current_position() {
        let state = at(&sample(), 1);
        assert_eq!(state.current_move().unwrap().san, "e5");
        assert_eq!(state.side_to_move().unwrap(), Color::White);
        assert_eq!(state.next_ply(), 3);
    }

    #[test]
    fn test_edits_share_untouched_state() {
        let state = at(&sample(), 1000);
        let promoted = state.edit(&EditAction::PromoteVariation).unwrap();
        assert_eq!(promoted.current, Some(MoveId::new(1000)));
        assert_eq!(promoted.tree.main_line()[1].san, "c5");
        assert_eq!(promoted.headers, state.headers);
        // the original snapshot is untouched
        assert_eq!(state.tree.main_line()[1].san, "e5");
    }

    #[test]
    fn test_noop_edits() {
        let start = sample();
        assert_eq!(start.edit(&EditAction::PromoteVariation), None);
        assert_eq!(start.edit(&EditAction::DeleteVariation), None);
        assert_eq!(start.edit(&EditAction::TruncateRemaining), None);

        let last = start.navigate(Navigation::Last).unwrap();
        assert_eq!(last.edit(&EditAction::TruncateRemaining), None);
        assert_eq!(last.edit(&EditAction::DeleteVariation), None);
    }

    #[test]
    fn test_append_and_variation() {
        let oracle = ShakmatyOracle::default();
        let last = sample().navigate(Navigation::Last).unwrap();
        let played = oracle.play_san(last.current_fen(), "Bb5").unwrap();
        let record = played.into_record(last.tree.next_id_after(MoveId::new(3)), last.next_ply());
        let appended = last.edit(&EditAction::AppendMove(record)).unwrap();
        assert_eq!(appended.current, Some(MoveId::new(4)));
        assert_eq!(appended.current_move().unwrap().ply, 5);

        let e4 = at(&sample(), 0);
        let played = oracle.play_san(e4.current_fen(), "e6").unwrap();
        let record = played.into_record(e4.tree.next_variation_id(), e4.next_ply());
        let branched = e4.edit(&EditAction::InsertVariation(record)).unwrap();
        assert_eq!(branched.current, Some(MoveId::new(2000)));
        assert_eq!(branched.tree.main_line()[1].variations.len(), 2);
    }

    #[test]
    fn test_action_tags() {
        assert_eq!(EditAction::PromoteVariation.tag(), ActionTag::Promote);
        assert_eq!(EditAction::TruncateRemaining.tag(), ActionTag::DeleteRemaining);
        assert_eq!(EditAction::LoadGame(Box::new(sample())).tag(), ActionTag::LoadPgn);
    }
}
