use std::fmt;
use std::str::FromStr;

/// Compass directions for bitboard and square shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

/// A board square as a 6-bit index: a1 = 0, b1 = 1, ..., h8 = 63.
/// Rank = index >> 3, file = index & 7. `Square::NONE` (64) is the
/// sentinel used when no en-passant square exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square(u8);

#[rustfmt::skip]
const SQUARE_NAMES: [&str; 65] = [
    "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1",
    "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2",
    "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3",
    "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4",
    "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5",
    "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6",
    "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7",
    "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8",
    "-",
];

impl Square {
    pub const NONE: Square = Square(64);

    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    #[inline(always)]
    pub const fn from_index(index: u8) -> Square {
        debug_assert!(index <= 64);
        Square(index)
    }

    #[inline(always)]
    pub const fn new(rank: u8, file: u8) -> Square {
        Square(rank * 8 + file)
    }

    #[inline(always)]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// Mirrors the square vertically (a1 <-> a8), used to index
    /// white-oriented piece-square tables for black.
    #[inline(always)]
    pub const fn flip(self) -> Square {
        Square(self.0 ^ 56)
    }

    #[inline(always)]
    pub const fn is_none(self) -> bool {
        self.0 >= 64
    }

    #[inline(always)]
    pub const fn bb(self) -> u64 {
        1u64 << self.0
    }
}

/// Rook origin square for a castling move, keyed by the king's destination.
#[inline]
pub const fn rook_from_castling(king_to: Square) -> Square {
    match king_to.index() {
        6 => Square::H1,  // g1
        2 => Square::A1,  // c1
        62 => Square::H8, // g8
        58 => Square::A8, // c8
        _ => Square::NONE,
    }
}

/// Rook destination square for a castling move, keyed by the king's destination.
#[inline]
pub const fn rook_to_castling(king_to: Square) -> Square {
    match king_to.index() {
        6 => Square::F1,
        2 => Square::D1,
        62 => Square::F8,
        58 => Square::D8,
        _ => Square::NONE,
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SQUARE_NAMES[self.0.min(64) as usize])
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(format!("invalid square: {s}"));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file > 7 || rank > 7 {
            return Err(format!("invalid square: {s}"));
        }
        Ok(Square::new(rank, file))
    }
}
