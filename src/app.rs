//! Terminal front-end: a line-oriented command loop over an [`Editor`].

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::domain::{GameTree, MoveId, MoveRecord};
use crate::models::{Editor, GameState};

const HELP: &str = "\
commands:
  <move>          play a move (UCI e2e4 or SAN Nf3)
  var <move>      add the move as a new variation
  first | last | next | prev
  goto <id>       jump to a move by id
  promote         promote the current variation
  delete          delete the current variation
  truncate        delete every move after the current one
  undo | redo
  load <file>     open a PGN file
  save <file>     write the game as PGN
  show            print the move list
  fen             print the current position
  help | quit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Play(String),
    Variation(String),
    First,
    Last,
    Next,
    Previous,
    Goto(MoveId),
    Promote,
    Delete,
    Truncate,
    Undo,
    Redo,
    Load(PathBuf),
    Save(PathBuf),
    Show,
    Fen,
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for a blank line
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if words.next().is_some() {
        bail!("too many arguments");
    }

    let needs = |what: &str| -> Result<String> {
        argument
            .map(str::to_string)
            .with_context(|| format!("{head} needs {what}"))
    };

    let command = match head {
        "first" | "start" => Command::First,
        "last" | "end" => Command::Last,
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Previous,
        "goto" => {
            let id: u32 = needs("a move id")?.parse().context("move ids are numbers")?;
            Command::Goto(MoveId::new(id))
        }
        "var" => Command::Variation(needs("a move")?),
        "promote" => Command::Promote,
        "delete" => Command::Delete,
        "truncate" => Command::Truncate,
        "undo" | "u" => Command::Undo,
        "redo" | "r" => Command::Redo,
        "load" => Command::Load(PathBuf::from(needs("a file")?)),
        "save" => Command::Save(PathBuf::from(needs("a file")?)),
        "show" | "ls" => Command::Show,
        "fen" => Command::Fen,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        mv if argument.is_none() => Command::Play(mv.to_string()),
        _ => bail!("unknown command {head:?}"),
    };
    Ok(Some(command))
}

/// Run a command and return the text to show
pub fn execute(editor: &mut Editor, command: Command) -> Result<String> {
    let changed = match command {
        Command::Play(text) => editor.play_text(&text)?,
        Command::Variation(text) => editor.branch(&text)?,
        Command::First => editor.goto_first(),
        Command::Last => editor.goto_last(),
        Command::Next => editor.goto_next(),
        Command::Previous => editor.goto_previous(),
        Command::Goto(id) => editor.goto_move(id),
        Command::Promote => editor.promote_variation(),
        Command::Delete => editor.delete_variation(),
        Command::Truncate => editor.truncate_remaining(),
        Command::Undo => editor.undo(),
        Command::Redo => editor.redo(),
        Command::Load(path) => {
            editor
                .open_pgn(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            true
        }
        Command::Save(path) => {
            fs::write(&path, editor.to_pgn())
                .with_context(|| format!("writing {}", path.display()))?;
            return Ok(format!("saved {}", path.display()));
        }
        Command::Show => true,
        Command::Fen => return Ok(editor.state().current_fen().to_string()),
        Command::Help => return Ok(HELP.to_string()),
        Command::Quit => return Ok(String::new()),
    };

    if changed {
        Ok(render(editor.state()))
    } else {
        Ok("nothing to do".to_string())
    }
}

/// Read commands from `input` until `quit` or end of input
pub fn run(editor: &mut Editor, mut input: impl BufRead, mut output: impl Write) -> Result<()> {
    writeln!(output, "{}", render(editor.state()))?;
    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = match parse_command(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(output, "error: {e:#}")?;
                continue;
            }
        };
        match execute(editor, command) {
            Ok(text) => writeln!(output, "{text}")?,
            Err(e) => {
                warn!("{e:#}");
                writeln!(output, "error: {e:#}")?;
            }
        }
    }
    Ok(())
}

/// Move list plus a status line
pub fn render(state: &GameState) -> String {
    let mut out = render_move_list(state.tree(), state.current);
    let status = match state.current_move() {
        Some(mv) => format!("at {} [{}]", numbered(mv), mv.id),
        None => "at start".to_string(),
    };
    out.push_str(&status);
    out
}

/// One row per white move, variations indented beneath the move they
/// replace. Every move shows its id; the current one is starred.
pub fn render_move_list(tree: &GameTree, current: Option<MoveId>) -> String {
    if tree.is_empty() {
        return "(no moves)\n".to_string();
    }
    let mut out = String::new();
    render_line(tree.main_line(), current, 0, &mut out);
    out
}

fn render_line(line: &[MoveRecord], current: Option<MoveId>, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    let mut row = String::new();

    for mv in line {
        if mv.is_white_move() && !row.is_empty() {
            out.push_str(&format!("{indent}{row}\n"));
            row.clear();
        }
        if row.is_empty() {
            row.push_str(&numbered(mv));
        } else {
            row.push(' ');
            row.push_str(&mv.san);
        }
        row.push_str(&format!("[{}]", mv.id));
        if current == Some(mv.id) {
            row.push('*');
        }

        if mv.has_variations() {
            out.push_str(&format!("{indent}{row}\n"));
            row.clear();
            for variation in &mv.variations {
                render_line(variation, current, depth + 1, out);
            }
        }
    }
    if !row.is_empty() {
        out.push_str(&format!("{indent}{row}\n"));
    }
}

fn numbered(mv: &MoveRecord) -> String {
    if mv.is_white_move() {
        format!("{}. {}", mv.move_number(), mv.san)
    } else {
        format!("{}... {}", mv.move_number(), mv.san)
    }
}
