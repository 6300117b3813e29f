//! Editor: the single entry point the front-end talks to.
//!
//! Owns the live [`GameState`], the undo history and the move oracle. Every
//! method is synchronous and reports whether the state changed.

use std::mem;
use std::path::Path;

use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::domain::chess::{MoveOracle, MoveRequest, PlayedMove, ShakmatyOracle};
use crate::domain::pgn::{self, read_pgn};
use crate::domain::{MoveId, MoveRecord};
use crate::error::Result;
use crate::models::game::{EditAction, GameState, Navigation};
use crate::models::undo::UndoHistory;

/// Everything the front-end can ask for
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Play(MoveRequest),
    PlaySan(String),
    Edit(EditAction),
    Navigate(Navigation),
    Undo,
    Redo,
    LoadPgn(String),
}

pub struct Editor {
    state: GameState,
    history: UndoHistory<GameState>,
    oracle: Box<dyn MoveOracle>,
}

impl Editor {
    /// Editor for a validated configuration
    pub fn new(config: &EditorConfig) -> Result<Self> {
        config.validate()?;
        let state = GameState::new(config.start_fen())?;
        Ok(Self::with_oracle(
            state,
            config.undo_limit,
            Box::new(ShakmatyOracle::new(config.auto_queen)),
        ))
    }

    pub fn with_oracle(state: GameState, undo_limit: usize, oracle: Box<dyn MoveOracle>) -> Self {
        Self {
            state,
            history: UndoHistory::new(undo_limit),
            oracle,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn history(&self) -> &UndoHistory<GameState> {
        &self.history
    }

    pub fn current(&self) -> Option<MoveId> {
        self.state.current
    }

    /// Reducer entry point
    pub fn dispatch(&mut self, action: Action) -> Result<bool> {
        match action {
            Action::Play(request) => self.play(&request),
            Action::PlaySan(san) => self.play_san(&san),
            Action::Edit(edit) => Ok(self.apply(edit)),
            Action::Navigate(navigation) => Ok(self.navigate(navigation)),
            Action::Undo => Ok(self.undo()),
            Action::Redo => Ok(self.redo()),
            Action::LoadPgn(text) => self.load_pgn(&text).map(|_| true),
        }
    }

    /// Apply an undoable edit; the prior state is recorded only when the
    /// edit changed something
    fn apply(&mut self, action: EditAction) -> bool {
        let tag = action.tag();
        let Some(next) = self.state.edit(&action) else {
            debug!(action = %tag, "edit left the game unchanged");
            return false;
        };
        let prior = mem::replace(&mut self.state, next);
        self.history.record(prior, tag);
        debug!(action = %tag, current = ?self.state.current, "edit applied");
        true
    }

    fn navigate(&mut self, navigation: Navigation) -> bool {
        match self.state.navigate(navigation) {
            Some(next) => {
                self.state = next;
                debug!(?navigation, current = ?self.state.current, "navigated");
                true
            }
            None => false,
        }
    }

    pub fn append_move(&mut self, record: MoveRecord) -> bool {
        self.apply(EditAction::AppendMove(record))
    }

    pub fn insert_variation(&mut self, record: MoveRecord) -> bool {
        self.apply(EditAction::InsertVariation(record))
    }

    pub fn promote_variation(&mut self) -> bool {
        self.apply(EditAction::PromoteVariation)
    }

    pub fn delete_variation(&mut self) -> bool {
        self.apply(EditAction::DeleteVariation)
    }

    pub fn truncate_remaining(&mut self) -> bool {
        self.apply(EditAction::TruncateRemaining)
    }

    pub fn goto_move(&mut self, id: MoveId) -> bool {
        self.navigate(Navigation::GotoMove(id))
    }

    pub fn goto_first(&mut self) -> bool {
        self.navigate(Navigation::First)
    }

    pub fn goto_last(&mut self) -> bool {
        self.navigate(Navigation::Last)
    }

    pub fn goto_next(&mut self) -> bool {
        self.navigate(Navigation::Next)
    }

    pub fn goto_previous(&mut self) -> bool {
        self.navigate(Navigation::Previous)
    }

    pub fn undo(&mut self) -> bool {
        let action = self.history.last_action();
        match self.history.undo(self.state.clone()) {
            Some(prior) => {
                self.state = prior;
                info!(action = ?action, "undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.state.clone()) {
            Some(next) => {
                self.state = next;
                info!(action = ?self.history.last_action(), "redo");
                true
            }
            None => false,
        }
    }

    /// Replace the game with one read from PGN text (undoable)
    pub fn load_pgn(&mut self, text: &str) -> Result<()> {
        let game = read_pgn(text, self.oracle.as_ref())?;
        let state = GameState::from_pgn(game)?;
        info!(moves = state.tree.len(), "game loaded");
        self.apply(EditAction::LoadGame(Box::new(state)));
        Ok(())
    }

    /// Read a PGN file and load it (undoable)
    pub fn open_pgn(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_pgn(&text)
    }

    pub fn to_pgn(&self) -> String {
        pgn::write_pgn(&self.state.headers, &self.state.tree)
    }

    /// Play a move given by its squares from the current position
    pub fn play(&mut self, request: &MoveRequest) -> Result<bool> {
        let played = self.oracle.play(self.state.current_fen(), request)?;
        Ok(self.place(played))
    }

    /// Play a move given in SAN from the current position
    pub fn play_san(&mut self, san: &str) -> Result<bool> {
        let played = self.oracle.play_san(self.state.current_fen(), san)?;
        Ok(self.place(played))
    }

    /// Play a move written either in UCI (`e2e4`) or SAN (`Nf3`)
    pub fn play_text(&mut self, text: &str) -> Result<bool> {
        let played = self.interpret(text)?;
        Ok(self.place(played))
    }

    /// Add a move as a new variation of the move following the current one,
    /// even when that move is already in the tree
    pub fn branch(&mut self, text: &str) -> Result<bool> {
        let played = self.interpret(text)?;
        let id = self.state.tree.next_variation_id();
        let ply = self.state.next_ply();
        Ok(self.insert_variation(played.into_record(id, ply)))
    }

    fn interpret(&self, text: &str) -> Result<PlayedMove> {
        let fen = self.state.current_fen();
        match text.parse::<MoveRequest>() {
            Ok(request) => self.oracle.play(fen, &request),
            Err(_) => self.oracle.play_san(fen, text),
        }
    }

    /// Put a legal move into the tree: follow it if it is already there,
    /// branch if another move follows the current one, append otherwise.
    fn place(&mut self, played: PlayedMove) -> bool {
        let tree = self.state.tree.clone();
        let ply = self.state.next_ply();

        let next_id = self.state.next_move().map(|mv| mv.id);
        let Some(next) = next_id.and_then(|id| tree.find(id)) else {
            let id = match self.state.current {
                Some(current) => tree.next_id_after(current),
                None => MoveId::main_line(0),
            };
            return self.append_move(played.into_record(id, ply));
        };

        let existing = std::iter::once(next)
            .chain(next.variations.iter().filter_map(|line| line.first()))
            .find(|mv| mv.san == played.san)
            .map(|mv| mv.id);
        if let Some(id) = existing {
            return self.goto_move(id);
        }

        let id = tree.next_variation_id();
        self.insert_variation(played.into_record(id, ply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chess::START_FEN;
    use crate::error::Error;
    use crate::models::undo::ActionTag;

    fn editor() -> Editor {
        Editor::new(&EditorConfig::default()).unwrap()
    }

    fn sans(editor: &Editor) -> Vec<String> {
        editor.state().tree.main_line().iter().map(|m| m.san.clone()).collect()
    }

    fn play(editor: &mut Editor, moves: &[&str]) {
        for san in moves {
            assert!(editor.play_san(san).unwrap(), "{san} was not placed");
        }
    }

    #[test]
    fn test_play_appends() {
        let mut editor = editor();
        play(&mut editor, &["e4", "e5", "Nf3"]);
        assert_eq!(sans(&editor), ["e4", "e5", "Nf3"]);
        let ids: Vec<u32> = editor.state().tree.main_line().iter().map(|m| m.id.raw()).collect();
        assert_eq!(ids, [0, 1, 2]);
        assert_eq!(editor.current(), Some(MoveId::new(2)));
        assert_eq!(editor.state().current_move().unwrap().ply, 3);
    }

    #[test]
    fn test_play_uci() {
        let mut editor = editor();
        assert!(editor.play(&"e2e4".parse().unwrap()).unwrap());
        assert_eq!(sans(&editor), ["e4"]);
        assert!(editor.play(&"e2e4".parse().unwrap()).is_err());
    }

    #[test]
    fn test_play_existing_move_navigates() {
        let mut editor = editor();
        play(&mut editor, &["e4", "e5"]);
        editor.goto_first();
        let before = editor.state().tree.clone();

        assert!(editor.play_san("e4").unwrap());
        assert_eq!(editor.current(), Some(MoveId::new(0)));
        assert_eq!(editor.state().tree, before);
        assert_eq!(editor.history().past_len(), 2);
    }

    #[test]
    fn test_play_branches() {
        let mut editor = editor();
        play(&mut editor, &["e4", "e5", "Nf3"]);
        editor.goto_move(MoveId::new(0));
        play(&mut editor, &["c5", "Nf3"]);

        let e5 = editor.state().tree.find(MoveId::new(1)).unwrap();
        assert_eq!(e5.variations.len(), 1);
        let ids: Vec<u32> = e5.variations[0].iter().map(|m| m.id.raw()).collect();
        assert_eq!(ids, [1000, 1001]);

        // replaying the variation's first move follows it
        editor.goto_move(MoveId::new(0));
        assert!(editor.play_san("c5").unwrap());
        assert_eq!(editor.current(), Some(MoveId::new(1000)));
    }

    #[test]
    fn test_branch_at_start() {
        let mut editor = editor();
        play(&mut editor, &["e4"]);
        editor.goto_first();
        play(&mut editor, &["d4"]);
        assert_eq!(editor.current(), Some(MoveId::new(1000)));
        assert_eq!(editor.state().tree.main_line()[0].variations[0][0].san, "d4");
    }

    #[test]
    fn test_undo_redo() {
        let mut editor = editor();
        play(&mut editor, &["e4", "e5"]);
        editor.goto_move(MoveId::new(0));
        play(&mut editor, &["c5"]);
        assert!(editor.promote_variation());
        assert_eq!(sans(&editor), ["e4", "c5"]);

        assert!(editor.undo());
        assert_eq!(sans(&editor), ["e4", "e5"]);
        assert_eq!(editor.current(), Some(MoveId::new(1000)));

        assert!(editor.redo());
        assert_eq!(sans(&editor), ["e4", "c5"]);
        assert_eq!(editor.history().last_action(), Some(ActionTag::Promote));
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut editor = editor();
        play(&mut editor, &["e4"]);
        let recorded = editor.history().past_len();
        assert!(!editor.truncate_remaining());
        assert!(!editor.promote_variation());
        assert!(!editor.delete_variation());
        assert_eq!(editor.history().past_len(), recorded);
    }

    #[test]
    fn test_navigation_is_not_undoable() {
        let mut editor = editor();
        play(&mut editor, &["e4", "e5"]);
        assert!(editor.goto_previous());
        assert!(editor.goto_first());
        assert!(!editor.goto_previous());
        assert!(editor.goto_last());
        assert!(!editor.goto_next());
        assert_eq!(editor.history().past_len(), 2);
    }

    #[test]
    fn test_load_and_export() {
        let mut editor = editor();
        editor
            .load_pgn("[White \"Alice\"]\n\n1. d4 d5 (1... Nf6) 2. c4 *")
            .unwrap();
        assert_eq!(editor.current(), None);
        assert_eq!(sans(&editor), ["d4", "d5", "c4"]);
        assert!(editor.to_pgn().contains("1. d4 d5 (1... Nf6) 2. c4 *"));
        assert!(editor.to_pgn().contains("[White \"Alice\"]"));

        assert!(editor.undo());
        assert!(editor.state().tree.is_empty());
        assert_eq!(editor.state().start_fen, START_FEN);
    }

    #[test]
    fn test_bad_pgn_keeps_state() {
        let mut editor = editor();
        play(&mut editor, &["e4"]);
        assert!(editor.load_pgn("1. e4 Ke2 *").is_err());
        assert_eq!(sans(&editor), ["e4"]);
    }

    #[test]
    fn test_play_text_and_branch() {
        let mut editor = editor();
        assert!(editor.play_text("e2e4").unwrap());
        assert!(editor.play_text("e5").unwrap());
        editor.goto_move(MoveId::new(0));

        // a duplicate of the main move still becomes a variation
        assert!(editor.branch("e7e5").unwrap());
        assert_eq!(editor.current(), Some(MoveId::new(1000)));
        assert_eq!(editor.state().tree.main_line()[1].variations.len(), 1);

        editor.goto_last();
        assert!(!editor.branch("Nf3").unwrap());
        assert!(editor.play_text("zz").is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EditorConfig::default().with_undo_limit(0);
        assert!(matches!(Editor::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let mut editor = editor();
        let err = editor.open_pgn("/nonexistent/game.pgn").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(editor.state().tree.is_empty());
    }

    #[test]
    fn test_dispatch() {
        let mut editor = editor();
        assert!(editor.dispatch(Action::PlaySan("e4".to_string())).unwrap());
        assert!(editor.dispatch(Action::Navigate(Navigation::First)).unwrap());
        assert!(editor.dispatch(Action::Play("d2d4".parse().unwrap())).unwrap());
        assert!(editor.dispatch(Action::Edit(EditAction::PromoteVariation)).unwrap());
        assert_eq!(sans(&editor), ["d4"]);
        assert!(editor.dispatch(Action::Undo).unwrap());
        assert!(editor.dispatch(Action::Redo).unwrap());
        assert!(!editor.dispatch(Action::Redo).unwrap());
        assert!(editor.dispatch(Action::PlaySan("Ke2".to_string())).is_err());
    }
}
