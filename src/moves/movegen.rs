//! Pseudo-legal move generation. Moves that leave the mover's own king in
//! check are filtered later by `Position::make_move`, with one exception:
//! castling is only emitted when the king's transit squares are safe.
//!
//! `NonQuiet` selects captures, en passant and promotions; `Quiet` selects
//! everything else, including castling and double pawn pushes.

use crate::bitboard::{BitboardExt, RANK_2, RANK_3, RANK_6, RANK_7};
use crate::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::board::{Color, Piece, PieceType, Position};
use crate::moves::king::KING_ATTACKS;
use crate::moves::knight::KNIGHT_ATTACKS;
use crate::moves::magic::{bishop_attacks, queen_attacks, rook_attacks};
use crate::moves::pawn::pawn_attacks;
use crate::moves::types::{Move, MoveList};
use crate::square::Square;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFilter {
    All,
    NonQuiet,
    Quiet,
}

pub fn generate_moves(filter: MoveFilter, position: &Position, list: &mut MoveList) {
    generate_pawn_moves(filter, position, list);
    if filter != MoveFilter::NonQuiet {
        generate_castling_moves(position, list);
    }
    for piece_type in [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ] {
        generate_piece_moves(filter, position, piece_type, list);
    }
}

/// Copy-make legality filter over the full pseudo-legal set. Convenience
/// for the frontend and tests; the search filters inline instead.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    let mut list = MoveList::new();
    generate_moves(MoveFilter::All, position, &mut list);

    let mut legal = Vec::with_capacity(list.len());
    for mv in list.iter() {
        let mut next = *position;
        if next.make_move(mv) {
            legal.push(mv);
        }
    }
    legal
}

fn generate_pawn_moves(filter: MoveFilter, position: &Position, list: &mut MoveList) {
    let color = position.side_to_move;
    let piece = Piece::make(color, PieceType::Pawn);
    let pawns = position.pieces(color, PieceType::Pawn);
    let enemy = position.occupancy(color.opposite());
    let empty = !position.occupied;

    // rank the pawns promote from, and the single-push rank that allows a
    // second step
    let (promo_from_rank, double_rank) = match color {
        Color::White => (RANK_7, RANK_3),
        Color::Black => (RANK_2, RANK_6),
    };
    let forward = |bb: u64| match color {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    };
    // from-square deltas, signed as "to minus from"
    let (push, cap_east, cap_west): (i32, i32, i32) = match color {
        Color::White => (8, 9, 7),
        Color::Black => (-8, -7, -9),
    };
    let from_of = |to: u8, delta: i32| Square::from_index((to as i32 - delta) as u8);

    let promoters = pawns & promo_from_rank;
    let rest = pawns & !promo_from_rank;

    if filter != MoveFilter::NonQuiet {
        let singles = forward(rest) & empty;
        let mut doubles = forward(singles & double_rank) & empty;

        let mut bb = singles;
        while bb != 0 {
            let to = bb.pop_lsb();
            list.add_move(from_of(to, push), Square::from_index(to), piece, false);
        }
        while doubles != 0 {
            let to = doubles.pop_lsb();
            list.add_double_push(from_of(to, 2 * push), Square::from_index(to), piece);
        }
    }

    if filter != MoveFilter::Quiet {
        if promoters != 0 {
            let mut pushes = forward(promoters) & empty;
            let mut easts = forward(promoters).east() & enemy;
            let mut wests = forward(promoters).west() & enemy;

            while pushes != 0 {
                let to = pushes.pop_lsb();
                list.add_promotions(from_of(to, push), Square::from_index(to), piece, false, color);
            }
            while easts != 0 {
                let to = easts.pop_lsb();
                list.add_promotions(
                    from_of(to, cap_east),
                    Square::from_index(to),
                    piece,
                    true,
                    color,
                );
            }
            while wests != 0 {
                let to = wests.pop_lsb();
                list.add_promotions(
                    from_of(to, cap_west),
                    Square::from_index(to),
                    piece,
                    true,
                    color,
                );
            }
        }

        let mut easts = forward(rest).east() & enemy;
        let mut wests = forward(rest).west() & enemy;
        while easts != 0 {
            let to = easts.pop_lsb();
            list.add_move(from_of(to, cap_east), Square::from_index(to), piece, true);
        }
        while wests != 0 {
            let to = wests.pop_lsb();
            list.add_move(from_of(to, cap_west), Square::from_index(to), piece, true);
        }

        if !position.en_passant_square.is_none() {
            let target = position.en_passant_square;
            let mut capturers =
                pawn_attacks(target.index(), color.opposite()) & rest;
            while capturers != 0 {
                let from = capturers.pop_lsb();
                list.add_en_passant(Square::from_index(from), target, piece);
            }
        }
    }
}

fn generate_castling_moves(position: &Position, list: &mut MoveList) {
    let color = position.side_to_move;
    let piece = Piece::make(color, PieceType::King);
    let occupied = position.occupied;
    let opponent = color.opposite();

    let empty_between = |squares: &[Square]| {
        squares.iter().all(|sq| occupied & sq.bb() == 0)
    };
    let safe_path = |squares: &[Square]| {
        squares
            .iter()
            .all(|&sq| !position.is_square_attacked_by(opponent, sq))
    };

    match color {
        Color::White => {
            if position.castling_rights & CASTLE_WK != 0
                && empty_between(&[Square::F1, Square::G1])
                && safe_path(&[Square::E1, Square::F1, Square::G1])
            {
                list.add_castling(Square::E1, Square::G1, piece);
            }
            if position.castling_rights & CASTLE_WQ != 0
                && empty_between(&[Square::B1, Square::C1, Square::D1])
                && safe_path(&[Square::E1, Square::D1, Square::C1])
            {
                list.add_castling(Square::E1, Square::C1, piece);
            }
        }
        Color::Black => {
            if position.castling_rights & CASTLE_BK != 0
                && empty_between(&[Square::F8, Square::G8])
                && safe_path(&[Square::E8, Square::F8, Square::G8])
            {
                list.add_castling(Square::E8, Square::G8, piece);
            }
            if position.castling_rights & CASTLE_BQ != 0
                && empty_between(&[Square::B8, Square::C8, Square::D8])
                && safe_path(&[Square::E8, Square::D8, Square::C8])
            {
                list.add_castling(Square::E8, Square::C8, piece);
            }
        }
    }
}

fn generate_piece_moves(
    filter: MoveFilter,
    position: &Position,
    piece_type: PieceType,
    list: &mut MoveList,
) {
    let color = position.side_to_move;
    let piece = Piece::make(color, piece_type);
    let own = position.occupancy(color);
    let enemy = position.occupancy(color.opposite());

    let mut from_bb = position.pieces(color, piece_type);
    while from_bb != 0 {
        let from = from_bb.pop_lsb();
        let attacks = match piece_type {
            PieceType::Knight => KNIGHT_ATTACKS[from as usize],
            PieceType::Bishop => bishop_attacks(from, position.occupied),
            PieceType::Rook => rook_attacks(from, position.occupied),
            PieceType::Queen => queen_attacks(from, position.occupied),
            PieceType::King => KING_ATTACKS[from as usize],
            PieceType::Pawn => unreachable!("pawns are generated set-parallel"),
        };

        let mut targets = attacks & !own;
        match filter {
            MoveFilter::All => {}
            MoveFilter::NonQuiet => targets &= enemy,
            MoveFilter::Quiet => targets &= !position.occupied,
        }

        while targets != 0 {
            let to = targets.pop_lsb();
            let capture = enemy & (1u64 << to) != 0;
            list.add_move(Square::from_index(from), Square::from_index(to), piece, capture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(filter: MoveFilter, fen: &str) -> usize {
        let pos = Position::from_fen(fen).unwrap();
        let mut list = MoveList::new();
        generate_moves(filter, &pos, &mut list);
        list.len()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        assert_eq!(count(MoveFilter::All, Position::START_FEN), 20);
        assert_eq!(count(MoveFilter::Quiet, Position::START_FEN), 20);
        assert_eq!(count(MoveFilter::NonQuiet, Position::START_FEN), 0);
    }

    #[test]
    fn filters_partition_the_full_set() {
        let fens = [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        ];
        for fen in fens {
            let all = count(MoveFilter::All, fen);
            let quiet = count(MoveFilter::Quiet, fen);
            let non_quiet = count(MoveFilter::NonQuiet, fen);
            assert_eq!(all, quiet + non_quiet, "partition broken for {fen}");
        }
    }

    #[test]
    fn non_quiet_means_capture_ep_or_promotion() {
        let pos = Position::from_fen(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        )
        .unwrap();
        let mut list = MoveList::new();
        generate_moves(MoveFilter::NonQuiet, &pos, &mut list);
        assert!(!list.is_empty());
        for mv in list.iter() {
            assert!(mv.is_capture() || mv.is_promotion(), "quiet move {mv} in NonQuiet");
        }
    }

    #[test]
    fn quiet_includes_castling_and_double_pushes() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut list = MoveList::new();
        generate_moves(MoveFilter::Quiet, &pos, &mut list);
        assert!(list.iter().any(|mv| mv.is_castling()));
        assert!(list.iter().any(|mv| mv.is_double_push()));
        for mv in list.iter() {
            assert!(mv.is_quiet());
        }
    }

    #[test]
    fn castling_blocked_by_attacked_transit_square() {
        // black rook on f8 covers f1: white may not castle kingside but may
        // castle queenside
        let pos =
            Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_castling_moves(&pos, &mut list);
        let castles: Vec<Move> = list.iter().collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to(), Square::C1);
    }

    #[test]
    fn castling_blocked_by_occupied_square() {
        let pos =
            Position::from_fen("4k3/8/8/8/8/8/8/R2QK2R w KQ - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_castling_moves(&pos, &mut list);
        // d1 queen blocks queenside only
        let castles: Vec<Move> = list.iter().collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to(), Square::G1);
    }

    #[test]
    fn en_passant_is_generated_for_both_capturers() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(MoveFilter::NonQuiet, &pos, &mut list);
        let eps: Vec<Move> = list.iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].to(), "d6".parse().unwrap());

        let pos = Position::from_fen("4k3/8/8/2pPp3/8/8/8/4K3 w - e6 0 1").unwrap();
        // no capturer adjacent to e6 except the d5 pawn
        let mut list = MoveList::new();
        generate_moves(MoveFilter::NonQuiet, &pos, &mut list);
        assert_eq!(list.iter().filter(|m| m.is_en_passant()).count(), 1);
    }

    #[test]
    fn black_pawns_move_down_the_board() {
        let pos = Position::from_fen("4k3/4p3/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_pawn_moves(MoveFilter::All, &pos, &mut list);
        let moves: Vec<Move> = list.iter().collect();
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().any(|m| m.to() == "e6".parse().unwrap()));
        assert!(moves.iter().any(|m| m.to() == "e5".parse().unwrap() && m.is_double_push()));
    }

    #[test]
    fn promotions_expand_to_four_moves_each() {
        let pos = Position::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(MoveFilter::NonQuiet, &pos, &mut list);
        // a8 push promotions + a7xb8 capture promotions
        assert_eq!(list.len(), 8);
        assert!(list.iter().all(|m| m.is_promotion()));
        assert_eq!(list.iter().filter(|m| m.is_capture()).count(), 4);
    }

    #[test]
    fn legal_filter_respects_pins() {
        // the e4 knight is pinned against the king by the e8 rook
        let pos = Position::from_fen("4r1k1/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
        let legal = legal_moves(&pos);
        assert!(legal.iter().all(|m| m.piece() != Piece::WhiteKnight));
    }
}
