//! PGN import and export.
//!
//! Import turns PGN text into a ready-made [`GameTree`] with ids assigned by
//! the block scheme (main line `0..`, each variation a fresh block in
//! pre-order). Every SAN token is replayed through the move oracle, so an
//! imported tree only ever holds legal moves.

use tracing::{debug, warn};

use crate::domain::chess::{self, MoveOracle, START_FEN};
use crate::domain::move_record::{BLOCK_SIZE, Line, MoveId, MoveRecord};
use crate::domain::move_tree::GameTree;
use crate::error::{Error, Result};

/// Tag pairs in the order they were read
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PgnHeaders(Vec<(String, String)>);

/// Tags written first, in this order, when exporting
const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

impl PgnHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a tag, replacing an existing value in place
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed PGN game
#[derive(Clone, Debug, PartialEq)]
pub struct PgnGame {
    pub headers: PgnHeaders,
    pub start_fen: String,
    pub tree: GameTree,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    San(String),
}

/// Parse a single PGN game
pub fn read_pgn(text: &str, oracle: &dyn MoveOracle) -> Result<PgnGame> {
    let text = sanitize(text);
    let (headers, movetext) = split_headers(&text);

    let start_fen = headers.get("FEN").unwrap_or(START_FEN).to_string();
    let start_ply = chess::ply_before(&start_fen)?;

    let mut parser = Parser {
        tokens: tokenize(&movetext),
        pos: 0,
        oracle,
    };
    let mut main_line = parser.parse_line(&start_fen, start_ply, 0)?;
    assign_ids(&mut main_line);

    let tree = GameTree::from_main_line(main_line);
    debug!(moves = tree.len(), "PGN parsed");
    Ok(PgnGame { headers, start_fen, tree })
}

/// Drop control characters and normalise Arena's `5. ..` black move numbers
fn sanitize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    cleaned.replace(". ..", "...")
}

fn split_headers(text: &str) -> (PgnHeaders, String) {
    let mut headers = PgnHeaders::new();
    let mut movetext = String::new();
    let mut in_headers = true;

    for line in text.lines() {
        let trimmed = line.trim();
        if in_headers && trimmed.starts_with('[') {
            if let Some((key, value)) = parse_tag(trimmed) {
                headers.set(key, value);
            }
            continue;
        }
        if !trimmed.is_empty() {
            in_headers = false;
        }
        movetext.push_str(line);
        movetext.push('\n');
    }
    (headers, movetext)
}

/// `[Key "Value"]`
fn parse_tag(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    let (key, rest) = inner.split_once(char::is_whitespace)?;
    let value = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((key.to_string(), unescape_tag_value(value)))
}

fn unescape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Backslash-escape `"` and `\` for a tag value
fn escape_tag_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn tokenize(movetext: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = movetext.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
            }
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_whitespace() => {}
            c => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | '{' | ';') {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                if let Some(san) = san_of_word(&word) {
                    tokens.push(Token::San(san));
                }
            }
        }
    }
    tokens
}

/// Reduce a movetext word to a SAN move, dropping move numbers, NAGs,
/// results and suffix annotations
fn san_of_word(word: &str) -> Option<String> {
    if word.starts_with('$') || matches!(word, "1-0" | "0-1" | "1/2-1/2" | "*") {
        return None;
    }
    if word.starts_with("0-0") {
        return Some(word.replace('0', "O"));
    }
    let without_number = word
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches('.');
    let san = without_number.trim_end_matches(['!', '?']);
    if san.is_empty() {
        None
    } else {
        Some(san.to_string())
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    oracle: &'a dyn MoveOracle,
}

impl Parser<'_> {
    /// Parse moves until the closing parenthesis of this line (or the end)
    fn parse_line(&mut self, fen: &str, ply_before: u32, depth: usize) -> Result<Line> {
        let mut line = Line::new();
        let mut fen = fen.to_string();
        let mut ply = ply_before;

        while let Some(token) = self.tokens.get(self.pos).cloned() {
            let index = self.pos;
            self.pos += 1;
            match token {
                Token::Close if depth == 0 => {
                    return Err(Error::Pgn { token: index, reason: "unbalanced ')'".to_string() });
                }
                Token::Close => return Ok(line),
                Token::Open => {
                    let Some(last) = line.last_mut() else {
                        return Err(Error::Pgn {
                            token: index,
                            reason: "variation before any move".to_string(),
                        });
                    };
                    let variation = self.parse_line(&last.fen_before, last.ply - 1, depth + 1)?;
                    if !variation.is_empty() {
                        last.variations.push(variation);
                    }
                }
                Token::San(san) => {
                    let played = self
                        .oracle
                        .play_san(&fen, &san)
                        .map_err(|e| Error::Pgn { token: index, reason: e.to_string() })?;
                    ply += 1;
                    fen = played.fen_after.clone();
                    line.push(played.into_record(MoveId::new(0), ply));
                }
            }
        }

        if depth > 0 {
            warn!("PGN ends inside a variation");
        }
        Ok(line)
    }
}

/// Main line gets `0..`; each variation met in pre-order gets the next block
fn assign_ids(main_line: &mut Line) {
    fn assign(line: &mut Line, block: u32, counter: &mut u32) {
        if line.len() > BLOCK_SIZE as usize {
            warn!(block, len = line.len(), "line longer than an id block");
        }
        for (position, mv) in line.iter_mut().enumerate() {
            mv.id = MoveId::variation(block, position as u32);
            for variation in mv.variations.iter_mut() {
                *counter += 1;
                assign(variation, *counter, counter);
            }
        }
    }
    let mut counter = 0;
    assign(main_line, 0, &mut counter);
}

/// Export a game as PGN text
pub fn write_pgn(headers: &PgnHeaders, tree: &GameTree) -> String {
    let mut out = String::new();
    for (key, default) in SEVEN_TAG_ROSTER {
        let value = escape_tag_value(headers.get(key).unwrap_or(default));
        out.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    for (key, value) in headers.iter() {
        if SEVEN_TAG_ROSTER.iter().any(|(k, _)| *k == key) {
            continue;
        }
        let value = escape_tag_value(value);
        out.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    out.push('\n');

    let result = headers.get("Result").unwrap_or("*");
    let movetext = write_movetext(tree, None);
    if movetext.is_empty() {
        out.push_str(result);
    } else {
        out.push_str(&format!("{movetext} {result}"));
    }
    out.push('\n');
    out
}

/// Movetext of the whole tree; the `cursor` move, if any, is wrapped in
/// square brackets
pub fn write_movetext(tree: &GameTree, cursor: Option<MoveId>) -> String {
    let mut words = Vec::new();
    write_line(tree.main_line(), cursor, &mut words);
    words.join(" ").replace("( ", "(").replace(" )", ")")
}

fn write_line(line: &[MoveRecord], cursor: Option<MoveId>, words: &mut Vec<String>) {
    let mut needs_number = true;
    for mv in line {
        if mv.is_white_move() {
            words.push(format!("{}.", mv.move_number()));
        } else if needs_number {
            words.push(format!("{}...", mv.move_number()));
        }
        if cursor == Some(mv.id) {
            words.push(format!("[{}]", mv.san));
        } else {
            words.push(mv.san.clone());
        }
        needs_number = false;

        for variation in &mv.variations {
            words.push("(".to_string());
            write_line(variation, cursor, words);
            words.push(")".to_string());
            needs_number = true;
        }
    }
}
