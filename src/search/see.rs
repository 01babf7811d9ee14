//! Static exchange evaluation: does the capture sequence on one square net
//! at least `threshold` centipawns for the side initiating it? Runs the
//! swap-off with least-valuable attackers, re-probing sliders so x-ray
//! attackers discovered by removals join the exchange.

use crate::bitboard::BitboardExt;
use crate::board::{Color, PieceType, Position};
use crate::moves::magic::{bishop_attacks, rook_attacks};
use crate::moves::types::Move;

/// Exchange values; the king is priced so it can never profitably be lost.
pub const SEE_VALUES: [i32; 6] = [100, 300, 300, 500, 900, 20_000];

#[inline(always)]
fn value_of(piece_type: PieceType) -> i32 {
    SEE_VALUES[piece_type.index()]
}

pub fn static_exchange_eval(position: &Position, mv: Move, threshold: i32) -> bool {
    // promotions are always worth trying
    if mv.is_promotion() {
        return true;
    }

    let to = mv.to();
    let from = mv.from();

    let captured = if mv.is_en_passant() {
        PieceType::Pawn
    } else {
        let piece = position.piece_at(to);
        if piece.is_none() {
            // nothing to win on the target square
            return threshold <= 0;
        }
        piece.piece_type()
    };

    let mut value = value_of(captured) - threshold;
    if value < 0 {
        return false;
    }

    value -= value_of(mv.piece().piece_type());
    if value >= 0 {
        return true;
    }

    let white_occupied = position.white.occupied;
    let black_occupied = position.black.occupied;

    let bishop_queens =
        position.white.bishops() | position.black.bishops() | position.white.queens() | position.black.queens();
    let rook_queens =
        position.white.rooks() | position.black.rooks() | position.white.queens() | position.black.queens();

    let mut occupied = (white_occupied | black_occupied) ^ from.bb();
    let mut attackers = position.attackers_to(to, occupied);
    let mut side_to_capture = position.side_to_move.opposite();

    loop {
        attackers &= occupied;

        let own_attackers = attackers
            & match side_to_capture {
                Color::White => white_occupied,
                Color::Black => black_occupied,
            };
        let other_attackers = attackers & !own_attackers;
        if own_attackers == 0 {
            break;
        }

        // least valuable attacker of the capturing side
        let mut attacker = PieceType::King;
        for piece_type in [
            PieceType::Pawn,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Rook,
            PieceType::Queen,
            PieceType::King,
        ] {
            if own_attackers & position.pieces(side_to_capture, piece_type) != 0 {
                attacker = piece_type;
                break;
            }
        }

        let capturing_side = side_to_capture;
        side_to_capture = side_to_capture.opposite();
        value = -value - value_of(attacker);

        if value >= 0 {
            // a king capture stands only if the opponent has no reply
            if attacker == PieceType::King && other_attackers != 0 {
                side_to_capture = side_to_capture.opposite();
            }
            break;
        }

        let attacker_bb = own_attackers & position.pieces(capturing_side, attacker);
        occupied ^= 1u64 << attacker_bb.lsb();

        // removals may uncover sliders behind the attacker
        if matches!(attacker, PieceType::Pawn | PieceType::Bishop | PieceType::Queen) {
            attackers |= bishop_attacks(to.index(), occupied) & bishop_queens;
        }
        if matches!(attacker, PieceType::Rook | PieceType::Queen) {
            attackers |= rook_attacks(to.index(), occupied) & rook_queens;
        }
    }

    side_to_capture != mv.piece().color()
}
