//! Move-generation oracle.
//!
//! The tree engine never checks legality itself. Given a position (FEN) and a
//! candidate move, the oracle either describes the move fully (SAN, resulting
//! FEN, flags, captured piece) or rejects it as illegal.

use std::fmt;
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Role, Square};

use crate::domain::move_record::{Links, MoveId, MoveRecord};
use crate::error::{Error, Result};

/// Standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A candidate move as entered by the user: origin, destination and an
/// optional promotion piece (UCI style, e.g. `e2e4`, `e7e8q`)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }

    pub fn with_promotion(mut self, role: Role) -> Self {
        self.promotion = Some(role);
        self
    }
}

impl FromStr for MoveRequest {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let invalid = || Error::InvalidMove(text.to_string());
        if !text.is_ascii() || !(4..=5).contains(&text.len()) {
            return Err(invalid());
        }
        let from = text[0..2].parse::<Square>().map_err(|_| invalid())?;
        let to = text[2..4].parse::<Square>().map_err(|_| invalid())?;
        let promotion = match text[4..].chars().next() {
            Some(c) => Some(Role::from_char(c.to_ascii_lowercase()).ok_or_else(invalid)?),
            None => None,
        };
        Ok(Self { from, to, promotion })
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

/// Everything the oracle knows about a legal move
#[derive(Clone, Debug, PartialEq)]
pub struct PlayedMove {
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub piece: Role,
    pub promotion: Option<Role>,
    pub captured: Option<Role>,
    pub flags: String,
    pub fen_before: String,
    pub fen_after: String,
}

impl PlayedMove {
    /// Turn the oracle's answer into a tree record with the given identity
    pub fn into_record(self, id: MoveId, ply: u32) -> MoveRecord {
        MoveRecord {
            id,
            ply,
            san: self.san,
            from: self.from,
            to: self.to,
            piece: self.piece,
            promotion: self.promotion,
            captured: self.captured,
            flags: self.flags,
            fen_before: self.fen_before,
            fen_after: self.fen_after,
            variations: Vec::new(),
            links: Links::default(),
        }
    }
}

/// Black-box move generator consulted before any move reaches the tree
pub trait MoveOracle {
    /// Play a move given by its squares
    fn play(&self, fen_before: &str, request: &MoveRequest) -> Result<PlayedMove>;

    /// Play a move given in SAN
    fn play_san(&self, fen_before: &str, san: &str) -> Result<PlayedMove>;
}

/// [`MoveOracle`] backed by shakmaty's legal move generation
#[derive(Clone, Copy, Debug)]
pub struct ShakmatyOracle {
    /// Promote to a queen when a promotion is requested without a piece
    auto_queen: bool,
}

impl ShakmatyOracle {
    pub fn new(auto_queen: bool) -> Self {
        Self { auto_queen }
    }
}

impl Default for ShakmatyOracle {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MoveOracle for ShakmatyOracle {
    fn play(&self, fen_before: &str, request: &MoveRequest) -> Result<PlayedMove> {
        let position = parse_position(fen_before)?;
        let wanted_promotion = request
            .promotion
            .or(if self.auto_queen { Some(Role::Queen) } else { None });

        let candidate = position.legal_moves().into_iter().find(|m| {
            let (from, to, rook) = endpoints(m);
            let squares_match =
                from == Some(request.from) && (to == request.to || rook == Some(request.to));
            squares_match && (promotion_of(m).is_none() || promotion_of(m) == wanted_promotion)
        });

        match candidate {
            Some(m) => describe(position, m, fen_before),
            None => Err(Error::IllegalMove {
                request: request.to_string(),
                fen: fen_before.to_string(),
            }),
        }
    }

    fn play_san(&self, fen_before: &str, san: &str) -> Result<PlayedMove> {
        let position = parse_position(fen_before)?;
        let parsed: SanPlus = san
            .parse()
            .map_err(|_| Error::InvalidMove(san.to_string()))?;
        let m = parsed.san.to_move(&position).map_err(|_| Error::IllegalMove {
            request: san.to_string(),
            fen: fen_before.to_string(),
        })?;
        describe(position, m, fen_before)
    }
}

/// Parse a FEN into a standard chess position
pub fn parse_position(fen: &str) -> Result<Chess> {
    let invalid = |reason: String| Error::InvalidFen { fen: fen.to_string(), reason };
    let parsed: Fen = fen.parse().map_err(|e: shakmaty::fen::ParseFenError| invalid(e.to_string()))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

/// FEN of a position
pub fn fen_of(position: &Chess) -> String {
    Fen::from_position(position, EnPassantMode::Legal).to_string()
}

/// Number of plies played before the given position (0 for the start position)
pub fn ply_before(fen: &str) -> Result<u32> {
    let position = parse_position(fen)?;
    let black = u32::from(position.turn() == Color::Black);
    (position.fullmoves().get() - 1)
        .checked_mul(2)
        .and_then(|plies| plies.checked_add(black))
        .ok_or_else(|| Error::InvalidFen {
            fen: fen.to_string(),
            reason: "fullmove number out of range".to_string(),
        })
}

/// Side to move in the given position
pub fn side_to_move(fen: &str) -> Result<Color> {
    Ok(parse_position(fen)?.turn())
}

/// Origin, destination as the user drags it (king destination for castling),
/// and the rook square for castling entered as king-takes-rook
fn endpoints(m: &Move) -> (Option<Square>, Square, Option<Square>) {
    match m {
        Move::Normal { from, to, .. } => (Some(*from), *to, None),
        Move::EnPassant { from, to } => (Some(*from), *to, None),
        Move::Castle { king, rook } => (Some(*king), castle_destination(*king, *rook), Some(*rook)),
        Move::Put { to, .. } => (None, *to, None),
    }
}

fn castle_destination(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() {
        shakmaty::File::G
    } else {
        shakmaty::File::C
    };
    Square::from_coords(file, king.rank())
}

fn promotion_of(m: &Move) -> Option<Role> {
    match m {
        Move::Normal { promotion, .. } => *promotion,
        _ => None,
    }
}

/// Describe a legal move in `position` the way the tree stores it
fn describe(position: Chess, m: Move, fen_before: &str) -> Result<PlayedMove> {
    let san = San::from_move(&position, m.clone()).to_string();

    let (piece, from, to, captured, flags) = match &m {
        Move::Normal { role, from, to, capture, promotion } => {
            let mut flags = String::new();
            if capture.is_some() {
                flags.push('c');
            } else if *role == Role::Pawn && from.distance(*to) == 2 {
                flags.push('b');
            } else {
                flags.push('n');
            }
            if promotion.is_some() {
                flags.push('p');
            }
            (*role, *from, *to, *capture, flags)
        }
        Move::EnPassant { from, to } => (Role::Pawn, *from, *to, Some(Role::Pawn), "e".to_string()),
        Move::Castle { king, rook } => {
            let flag = if rook.file() > king.file() { "k" } else { "q" };
            (Role::King, *king, castle_destination(*king, *rook), None, flag.to_string())
        }
        Move::Put { .. } => {
            return Err(Error::InvalidMove(san));
        }
    };
    let promotion = promotion_of(&m);

    let after = position.play(m).map_err(|_| Error::IllegalMove {
        request: san.clone(),
        fen: fen_before.to_string(),
    })?;
    let suffix = if after.is_checkmate() {
        "#"
    } else if after.is_check() {
        "+"
    } else {
        ""
    };

    Ok(PlayedMove {
        san: format!("{san}{suffix}"),
        from,
        to,
        piece,
        promotion,
        captured,
        flags,
        fen_before: fen_before.to_string(),
        fen_after: fen_of(&after),
    })
}
