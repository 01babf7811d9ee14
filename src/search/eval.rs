//! Static evaluation: tapered material and piece-square scores interpolated
//! by game phase, plus a tempo bonus. The search only depends on the
//! signature `Position -> centipawns, side-relative`; the weights below are
//! plain data.

use crate::bitboard::LIGHT_SQUARES;
use crate::board::{Color, PIECE_TYPES, PieceType, Position};
use crate::bitboard::BitboardExt;

/// A middlegame/endgame score pair.
#[derive(Debug, Clone, Copy)]
pub struct Taper {
    pub mg: i32,
    pub eg: i32,
}

const fn s(mg: i32, eg: i32) -> Taper {
    Taper { mg, eg }
}

pub const PAWN_VALUE: Taper = s(82, 144);
pub const KNIGHT_VALUE: Taper = s(426, 475);
pub const BISHOP_VALUE: Taper = s(441, 510);
pub const ROOK_VALUE: Taper = s(627, 803);
pub const QUEEN_VALUE: Taper = s(1292, 1623);

const PIECE_VALUES: [Taper; 6] = [
    PAWN_VALUE,
    KNIGHT_VALUE,
    BISHOP_VALUE,
    ROOK_VALUE,
    QUEEN_VALUE,
    s(0, 0),
];

pub const TEMPO_BONUS: i32 = 10;

const KNIGHT_PHASE: i32 = 1;
const BISHOP_PHASE: i32 = 1;
const ROOK_PHASE: i32 = 2;
const QUEEN_PHASE: i32 = 4;
const PHASE_MIDGAME: i32 = 24;

// Piece-square tables from white's perspective, index 0 = a1. Black uses
// the vertically mirrored square.
#[rustfmt::skip]
const PAWN_PST: [Taper; 64] = [
    s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0),
    s(-13,  7), s( -4,  0), s(  1,  4), s(  6,  1), s(  3, 10), s( -9,  4), s( -9,  3), s(-16,  7),
    s(-21,  5), s(-17,  6), s( -1, -6), s( 12,-14), s(  8,-10), s( -4, -5), s(-15,  7), s(-24, 11),
    s(-14, 16), s(-21, 17), s(  9,-10), s( 10,-24), s(  4,-22), s(  4,-10), s(-20, 17), s(-17, 18),
    s(-15, 18), s(-18, 11), s(-16, -8), s(  4,-30), s( -2,-24), s(-18, -9), s(-23, 13), s(-17, 21),
    s(-20, 48), s( -9, 44), s(  1, 31), s( 17, -9), s( 36, -6), s( -9, 31), s( -6, 45), s(-23, 49),
    s(-33,-70), s(-66, -9), s(-16,-22), s( 65,-23), s( 41,-18), s( 39,-14), s(-47,  4), s(-62,-51),
    s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0), s(  0,  0),
];

#[rustfmt::skip]
const KNIGHT_PST: [Taper; 64] = [
    s( -31,-38), s(  -6,-24), s( -20,-22), s( -16, -1), s( -11, -1), s( -22,-19), s(  -8,-20), s( -41,-30),
    s(   1, -5), s( -11,  3), s(  -6,-19), s(  -1, -2), s(   0,  0), s(  -9,-16), s(  -8, -3), s(  -6,  1),
    s(   7,-21), s(   8, -5), s(   7,  2), s(  10, 19), s(  10, 19), s(   4,  2), s(   8, -4), s(   3,-19),
    s(  16, 21), s(  17, 30), s(  23, 41), s(  27, 50), s(  24, 53), s(  23, 41), s(  19, 28), s(  13, 26),
    s(  13, 30), s(  23, 30), s(  37, 51), s(  30, 70), s(  26, 67), s(  38, 50), s(  22, 33), s(  14, 28),
    s( -24, 25), s(  -5, 37), s(  25, 56), s(  22, 60), s(  27, 55), s(  29, 55), s(  -1, 32), s( -19, 25),
    s(  13, -2), s( -11, 18), s(  27, -2), s(  37, 24), s(  41, 24), s(  40, -7), s( -13, 16), s(   2, -2),
    s(-167, -5), s( -91, 12), s(-117, 41), s( -38, 17), s( -18, 19), s(-105, 48), s(-119, 24), s(-165,-17),
];

#[rustfmt::skip]
const BISHOP_PST: [Taper; 64] = [
    s(   5,-21), s(   1,  1), s(  -1,  5), s(   1,  5), s(   2,  8), s(  -6, -2), s(   0,  1), s(   4,-25),
    s(  26,-17), s(   2,-31), s(  15, -2), s(   8,  8), s(   8,  8), s(  13, -3), s(   9,-31), s(  26,-29),
    s(   9,  3), s(  22,  9), s(  -5, -3), s(  18, 19), s(  17, 20), s(  -5, -6), s(  20,  4), s(  15,  8),
    s(   0, 12), s(  10, 17), s(  17, 32), s(  20, 32), s(  24, 34), s(  12, 30), s(  15, 17), s(   0, 14),
    s( -20, 34), s(  13, 31), s(   1, 38), s(  21, 45), s(  12, 46), s(   6, 38), s(  13, 33), s( -14, 37),
    s( -13, 31), s( -11, 45), s(  -7, 23), s(   2, 40), s(   8, 38), s( -21, 34), s(  -5, 46), s(  -9, 35),
    s( -59, 38), s( -49, 22), s( -13, 30), s( -35, 36), s( -33, 36), s( -13, 33), s( -68, 21), s( -55, 35),
    s( -66, 18), s( -65, 36), s(-123, 48), s(-107, 56), s(-112, 53), s( -97, 43), s( -33, 22), s( -74, 15),
];

#[rustfmt::skip]
const ROOK_PST: [Taper; 64] = [
    s( -26, -1), s( -21,  3), s( -14,  4), s(  -6, -4), s(  -5, -4), s( -10,  3), s( -13, -2), s( -22,-14),
    s( -70,  5), s( -25,-10), s( -18, -7), s( -11,-11), s(  -9,-13), s( -15,-15), s( -15,-17), s( -77,  3),
    s( -39,  3), s( -16, 14), s( -25,  9), s( -14,  2), s( -12,  3), s( -25,  8), s(  -4,  9), s( -39,  1),
    s( -32, 24), s( -21, 36), s( -21, 36), s(  -5, 26), s(  -8, 27), s( -19, 34), s( -13, 33), s( -30, 24),
    s( -22, 46), s(   4, 38), s(  16, 38), s(  35, 30), s(  33, 32), s(  10, 36), s(  17, 31), s( -14, 43),
    s( -33, 60), s(  17, 41), s(   0, 54), s(  33, 36), s(  29, 35), s(   3, 52), s(  33, 32), s( -26, 56),
    s( -18, 41), s( -24, 47), s(  -1, 38), s(  15, 38), s(  14, 37), s(  -2, 36), s( -24, 49), s( -12, 38),
    s(  33, 55), s(  24, 63), s(  -1, 73), s(   9, 66), s(  10, 67), s(   0, 69), s(  34, 59), s(  37, 56),
];

#[rustfmt::skip]
const QUEEN_PST: [Taper; 64] = [
    s(  20,-34), s(   4,-26), s(   9,-34), s(  17,-16), s(  18,-18), s(  14,-46), s(   9,-28), s(  22,-44),
    s(   6,-15), s(  15,-22), s(  22,-42), s(  13,  2), s(  17,  0), s(  22,-49), s(  18,-29), s(   3,-18),
    s(   6, -1), s(  21,  7), s(   5, 35), s(   0, 34), s(   2, 34), s(   5, 37), s(  24,  9), s(  13,-15),
    s(   9, 17), s(  12, 46), s(  -6, 59), s( -19,109), s( -17,106), s(  -4, 57), s(  18, 48), s(   8, 33),
    s( -10, 42), s(  -8, 79), s( -19, 66), s( -32,121), s( -32,127), s( -23, 80), s(  -8, 95), s( -10, 68),
    s( -28, 56), s( -23, 50), s( -33, 66), s( -18, 70), s( -17, 71), s( -19, 63), s( -18, 65), s( -28, 76),
    s( -16, 61), s( -72,108), s( -19, 65), s( -52,114), s( -54,120), s( -14, 59), s( -69,116), s( -11, 73),
    s(   8, 43), s(  19, 47), s(   0, 79), s(   3, 78), s(  -3, 89), s(  13, 65), s(  18, 79), s(  21, 56),
];

#[rustfmt::skip]
const KING_PST: [Taper; 64] = [
    s(  87,-77), s(  67,-49), s(   4, -7), s(  -9,-26), s( -10,-27), s(  -8, -1), s(  57,-50), s(  79,-82),
    s(  35,  3), s( -27, -3), s( -41, 16), s( -89, 29), s( -64, 26), s( -64, 28), s( -25, -3), s(  30, -4),
    s( -44,-19), s( -16,-19), s(  28,  7), s(   0, 35), s(  18, 32), s(  31,  9), s( -13,-18), s( -36,-13),
    s( -48,-44), s(  98,-39), s(  71, 12), s( -22, 45), s(  12, 41), s(  79, 10), s( 115,-34), s( -59,-38),
    s(  -6,-10), s(  95,-39), s(  39, 14), s( -49, 18), s( -27, 19), s(  35, 14), s(  81,-34), s( -50,-13),
    s(  24,-39), s( 123,-22), s( 105, -1), s( -22,-21), s( -39,-20), s(  74,-15), s( 100,-23), s( -17,-49),
    s(   0,-98), s(  28,-21), s(   7,-18), s(  -3,-41), s( -57,-39), s(  12,-26), s(  22,-24), s( -15,-119),
    s( -16,-153), s( 49,-94), s( -21,-73), s( -19,-32), s( -51,-55), s( -42,-62), s(  53,-93), s( -58,-133),
];

const PIECE_PST: [&[Taper; 64]; 6] = [
    &PAWN_PST,
    &KNIGHT_PST,
    &BISHOP_PST,
    &ROOK_PST,
    &QUEEN_PST,
    &KING_PST,
];

/// Centipawn evaluation from the side to move's perspective.
pub fn evaluate(position: &Position) -> i32 {
    if insufficient_material(position) {
        return 0;
    }

    let mut mg = 0i32;
    let mut eg = 0i32;
    let mut phase = 0i32;

    for piece_type in PIECE_TYPES {
        let value = PIECE_VALUES[piece_type.index()];
        let pst = PIECE_PST[piece_type.index()];

        let mut white = position.pieces(Color::White, piece_type);
        while white != 0 {
            let sq = white.pop_lsb() as usize;
            mg += value.mg + pst[sq].mg;
            eg += value.eg + pst[sq].eg;
        }

        let mut black = position.pieces(Color::Black, piece_type);
        while black != 0 {
            let sq = (black.pop_lsb() ^ 56) as usize;
            mg -= value.mg + pst[sq].mg;
            eg -= value.eg + pst[sq].eg;
        }

        phase += phase_weight(piece_type)
            * (position.pieces(Color::White, piece_type).count_ones() as i32
                + position.pieces(Color::Black, piece_type).count_ones() as i32);
    }

    let phase = phase.min(PHASE_MIDGAME);
    let white_score = (mg * phase + eg * (PHASE_MIDGAME - phase)) / PHASE_MIDGAME;

    let side_relative = match position.side_to_move {
        Color::White => white_score,
        Color::Black => -white_score,
    };
    side_relative + TEMPO_BONUS
}

#[inline]
fn phase_weight(piece_type: PieceType) -> i32 {
    match piece_type {
        PieceType::Knight => KNIGHT_PHASE,
        PieceType::Bishop => BISHOP_PHASE,
        PieceType::Rook => ROOK_PHASE,
        PieceType::Queen => QUEEN_PHASE,
        _ => 0,
    }
}

/// Neither side can mate: no pawn, rook or queen on the board, and the
/// minors amount to K vs K, a lone minor, or one bishop each on the same
/// colour complex.
pub fn insufficient_material(position: &Position) -> bool {
    let majors = position.white.pawns()
        | position.black.pawns()
        | position.white.rooks()
        | position.black.rooks()
        | position.white.queens()
        | position.black.queens();
    if majors != 0 {
        return false;
    }

    let knights = position.white.knights() | position.black.knights();
    let bishops = position.white.bishops() | position.black.bishops();
    let minor_count = (knights | bishops).count();

    match minor_count {
        0 | 1 => true,
        2 => {
            // two bishops, one per side, on the same colour complex
            knights == 0
                && position.white.bishops().count() == 1
                && position.black.bishops().count() == 1
                && ((bishops & LIGHT_SQUARES).count() == 2
                    || (bishops & LIGHT_SQUARES).count() == 0)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_tempo_for_either_side() {
        let pos = Position::startpos();
        assert_eq!(evaluate(&pos), TEMPO_BONUS);

        let mut black_to_move = pos;
        black_to_move.make_null_move();
        assert_eq!(evaluate(&black_to_move), TEMPO_BONUS);
    }

    #[test]
    fn an_extra_queen_dominates_the_score() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(evaluate(&pos) > 800);
        let mut flipped = pos;
        flipped.make_null_move();
        assert!(evaluate(&flipped) < -800);
    }

    #[test]
    fn mirrored_positions_evaluate_equally() {
        let white = Position::from_fen("4k3/8/8/8/8/8/PPP5/4K3 w - - 0 1").unwrap();
        let black = Position::from_fen("4k3/ppp5/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(evaluate(&white), evaluate(&black));
    }

    #[test]
    fn insufficient_material_cases() {
        let drawn = [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",        // K vs K
            "4k3/8/8/8/8/8/8/2N1K3 w - - 0 1",      // K+N vs K
            "2b1k3/8/8/8/8/8/8/4K3 b - - 0 1",      // K vs K+B
            "1b2k3/8/8/8/8/8/8/B3K3 w - - 0 1",     // same-colour bishops (a1, b8 both dark)
        ];
        for fen in drawn {
            assert!(
                insufficient_material(&Position::from_fen(fen).unwrap()),
                "{fen} should be insufficient"
            );
        }

        let live = [
            "4k3/8/8/8/8/8/8/3RK3 w - - 0 1",       // rook mates
            "4k3/7p/8/8/8/8/8/4K3 w - - 0 1",       // pawn promotes
            "2b1k3/8/8/8/8/8/8/B3K3 w - - 0 1",     // opposite-colour bishops (a1 dark, c8 light)
            "4k3/8/8/8/8/8/8/1NN1K3 w - - 0 1",     // two knights (not in the drawn set)
        ];
        for fen in live {
            assert!(
                !insufficient_material(&Position::from_fen(fen).unwrap()),
                "{fen} should be sufficient"
            );
        }
    }
}
