//! A single ply of a game record and the block-based id scheme.
//!
//! Pure domain module: the facts about a move come from the move-generation
//! oracle and are never recomputed here.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{Role, Square};

/// Number of ids reserved for each line (main line or one variation).
pub const BLOCK_SIZE: u32 = 1000;

/// Identifier of a move anywhere in the tree.
///
/// Ids `0..1000` belong to the main line block; a variation created with
/// ordinal `k` owns `k * 1000 ..`. The block is therefore `id / 1000`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(u32);

impl MoveId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Id of the move at `position` in the main line block
    pub const fn main_line(position: u32) -> Self {
        Self(position)
    }

    /// Id of the move at `position` in the variation block `ordinal`
    pub const fn variation(ordinal: u32, position: u32) -> Self {
        Self(ordinal * BLOCK_SIZE + position)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn block(self) -> u32 {
        self.0 / BLOCK_SIZE
    }

    /// Position of this id inside its block
    pub const fn position(self) -> u32 {
        self.0 % BLOCK_SIZE
    }

    /// True for ids allocated in the main line block.
    ///
    /// This is a classification of the id only; after a promotion a move keeps
    /// its id even though the line it lives in changed status.
    pub const fn is_main_line_block(self) -> bool {
        self.0 < BLOCK_SIZE
    }

    /// The next id in the same block, or `None` when the block is full
    pub fn successor(self) -> Option<Self> {
        if self.position() + 1 < BLOCK_SIZE {
            Some(Self(self.0 + 1))
        } else {
            None
        }
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered sequence of moves: the main line or one variation.
pub type Line = Vec<MoveRecord>;

/// Derived navigation links, rebuilt by the linker after every mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub(crate) previous: Option<MoveId>,
    pub(crate) next: Option<MoveId>,
}

/// One ply of the game record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub id: MoveId,
    /// Absolute half-move number from the start of the game (first move is 1)
    pub ply: u32,
    pub san: String,
    #[serde(with = "square_text")]
    pub from: Square,
    #[serde(with = "square_text")]
    pub to: Square,
    #[serde(with = "role_text")]
    pub piece: Role,
    #[serde(default, with = "opt_role_text", skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Role>,
    #[serde(default, with = "opt_role_text", skip_serializing_if = "Option::is_none")]
    pub captured: Option<Role>,
    /// chess.js style flags (`n`, `b`, `e`, `c`, `p`, `k`, `q`)
    pub flags: String,
    pub fen_before: String,
    pub fen_after: String,
    /// Alternatives to this move, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<Line>,
    #[serde(skip)]
    pub(crate) links: Links,
}

impl MoveRecord {
    /// The move after this one in its own line (derived)
    pub fn next(&self) -> Option<MoveId> {
        self.links.next
    }

    /// The predecessor in its own line, or the branch point for the first
    /// move of a variation (derived)
    pub fn previous(&self) -> Option<MoveId> {
        self.links.previous
    }

    pub fn has_variations(&self) -> bool {
        !self.variations.is_empty()
    }

    /// Full-move number for display (1-based)
    pub fn move_number(&self) -> u32 {
        self.ply.div_ceil(2).max(1)
    }

    pub fn is_white_move(&self) -> bool {
        self.ply % 2 == 1
    }

    /// Copy of this move and its whole sub-tree with every link cleared
    pub fn unlinked(&self) -> MoveRecord {
        let mut copy = self.clone();
        copy.clear_links();
        copy
    }

    pub(crate) fn clear_links(&mut self) {
        self.links = Links::default();
        for variation in &mut self.variations {
            for mv in variation.iter_mut() {
                mv.clear_links();
            }
        }
    }
}

mod square_text {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use shakmaty::Square;

    pub fn serialize<S: Serializer>(square: &Square, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(square)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Square, D::Error> {
        let text = String::deserialize(d)?;
        text.parse::<Square>()
            .map_err(|_| D::Error::custom(format!("invalid square: {text}")))
    }
}

mod role_text {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use shakmaty::Role;

    pub fn serialize<S: Serializer>(role: &Role, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(role.char())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Role, D::Error> {
        let c = char::deserialize(d)?;
        Role::from_char(c.to_ascii_lowercase())
            .ok_or_else(|| D::Error::custom(format!("invalid piece: {c}")))
    }
}

mod opt_role_text {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use shakmaty::Role;

    pub fn serialize<S: Serializer>(role: &Option<Role>, s: S) -> Result<S::Ok, S::Error> {
        match role {
            Some(role) => s.serialize_some(&role.char()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Role>, D::Error> {
        match Option::<char>::deserialize(d)? {
            Some(c) => Role::from_char(c.to_ascii_lowercase())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid piece: {c}"))),
            None => Ok(None),
        }
    }
}

/// Builders for hand-made records in tests; the oracle is not involved.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn mv(id: u32, san: &str) -> MoveRecord {
        MoveRecord {
            id: MoveId::new(id),
            ply: 1,
            san: san.to_string(),
            from: Square::E2,
            to: Square::E4,
            piece: Role::Pawn,
            promotion: None,
            captured: None,
            flags: "n".to_string(),
            fen_before: String::new(),
            fen_after: String::new(),
            variations: Vec::new(),
            links: Links::default(),
        }
    }

    pub fn with_variations(mut record: MoveRecord, variations: Vec<Line>) -> MoveRecord {
        record.variations = variations;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_scheme() {
        let main = MoveId::main_line(7);
        assert!(main.is_main_line_block());
        assert_eq!(main.block(), 0);

        let var = MoveId::variation(3, 4);
        assert_eq!(var.raw(), 3004);
        assert_eq!(var.block(), 3);
        assert_eq!(var.position(), 4);
        assert!(!var.is_main_line_block());
    }

    #[test]
    fn test_successor_stops_at_block_end() {
        assert_eq!(MoveId::new(1000).successor(), Some(MoveId::new(1001)));
        assert_eq!(MoveId::new(999).successor(), None);
        assert_eq!(MoveId::new(2999).successor(), None);
    }

    #[test]
    fn test_move_number() {
        let mut record = fixtures::mv(0, "e4");
        record.ply = 1;
        assert_eq!(record.move_number(), 1);
        assert!(record.is_white_move());
        record.ply = 2;
        assert_eq!(record.move_number(), 1);
        assert!(!record.is_white_move());
        record.ply = 5;
        assert_eq!(record.move_number(), 3);
    }

    #[test]
    fn test_unlinked_clears_nested_links() {
        let mut inner = fixtures::mv(1000, "c5");
        inner.links.previous = Some(MoveId::new(0));
        let mut outer = fixtures::with_variations(fixtures::mv(1, "e5"), vec![vec![inner]]);
        outer.links.next = Some(MoveId::new(2));

        let copy = outer.unlinked();
        assert_eq!(copy.next(), None);
        assert_eq!(copy.variations[0][0].previous(), None);
        // Source untouched
        assert_eq!(outer.next(), Some(MoveId::new(2)));
    }
}
