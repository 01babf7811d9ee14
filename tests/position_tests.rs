//! Position invariants under move application: disjoint occupancies,
//! correct castling/en-passant/halfmove bookkeeping, and copy-make leaving
//! the parent untouched.

use peregrine::board::{CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, PIECE_TYPES, Position};
use peregrine::moves::movegen::legal_moves;
use peregrine::moves::types::Move;
use peregrine::square::Square;

fn find_move(position: &Position, uci: &str) -> Move {
    legal_moves(position)
        .into_iter()
        .find(|m| m.to_uci() == uci)
        .unwrap_or_else(|| panic!("move {uci} not legal here"))
}

fn assert_occupancy_invariants(position: &Position) {
    assert_eq!(
        position.occupied,
        position.white.occupied | position.black.occupied
    );
    assert_eq!(position.white.occupied & position.black.occupied, 0);
    for color in [Color::White, Color::Black] {
        let union = PIECE_TYPES
            .iter()
            .fold(0u64, |acc, &pt| acc | position.pieces(color, pt));
        assert_eq!(union, position.occupancy(color));
        // piece boards are pairwise disjoint
        for (i, &a) in PIECE_TYPES.iter().enumerate() {
            for &b in &PIECE_TYPES[i + 1..] {
                assert_eq!(position.pieces(color, a) & position.pieces(color, b), 0);
            }
        }
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[test]
fn invariants_hold_through_random_play() {
    let mut seed = 7u64;
    for _game in 0..5 {
        let mut position = Position::startpos();
        for _ply in 0..300 {
            assert_occupancy_invariants(&position);
            let moves = legal_moves(&position);
            if moves.is_empty() {
                break;
            }
            seed = splitmix64(seed);
            assert!(position.make_move(moves[(seed as usize) % moves.len()]));
        }
    }
}

#[test]
fn random_walk_from_kiwipete_stays_coherent() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(42);
    for _game in 0..3 {
        let mut position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        for _ply in 0..120 {
            let moves = legal_moves(&position);
            if moves.is_empty() {
                break;
            }
            let mv = moves[rng.random_range(0..moves.len())];
            assert!(position.make_move(mv));
            assert_occupancy_invariants(&position);
            assert_eq!(position.hash, position.compute_hash());
        }
    }
}

#[test]
fn copy_make_leaves_the_parent_untouched() {
    let parent = Position::startpos();
    let snapshot = parent;
    let mv = find_move(&parent, "e2e4");

    let mut child = parent;
    assert!(child.make_move(mv));

    assert_eq!(parent, snapshot);
    assert_ne!(child, parent);
    // the child is a coherent position in its own right
    assert_eq!(child.hash, child.compute_hash());
    assert_eq!(child, Position::from_fen(&child.to_fen()).unwrap());
}

#[test]
fn double_push_sets_and_clears_the_ep_square() {
    let mut position = Position::startpos();
    assert!(position.make_move(find_move(&position, "e2e4")));
    assert_eq!(position.en_passant_square, "e3".parse::<Square>().unwrap());

    assert!(position.make_move(find_move(&position, "g8f6")));
    assert!(position.en_passant_square.is_none());
}

#[test]
fn en_passant_capture_removes_the_pawn_behind() {
    let mut position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    assert!(position.make_move(find_move(&position, "e5d6")));
    // the d5 pawn is gone, the capturer sits on d6
    assert_eq!(position.black.pawns(), 0);
    assert_eq!(
        position.white.pawns(),
        "d6".parse::<Square>().unwrap().bb()
    );
    assert_eq!(position.hash, position.compute_hash());
}

#[test]
fn castling_teleports_the_rook() {
    let mut position =
        Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(position.make_move(find_move(&position, "e1g1")));

    assert_eq!(position.piece_at(Square::G1).to_char(), 'K');
    assert_eq!(position.piece_at(Square::F1).to_char(), 'R');
    assert!(position.piece_at(Square::H1).is_none());
    assert!(position.piece_at(Square::E1).is_none());
    assert_eq!(position.castling_rights & (CASTLE_WK | CASTLE_WQ), 0);
    assert_eq!(position.hash, position.compute_hash());

    // black retains both rights and can still castle long
    assert!(position.make_move(find_move(&position, "e8c8")));
    assert_eq!(position.piece_at(Square::C8).to_char(), 'k');
    assert_eq!(position.piece_at(Square::D8).to_char(), 'r');
    assert_eq!(position.castling_rights, 0);
}

#[test]
fn rook_moves_and_rook_captures_clear_single_rights() {
    let mut position =
        Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(position.make_move(find_move(&position, "h1h8")));
    // white loses kingside by moving the rook, black loses kingside by
    // having the corner captured
    assert_eq!(position.castling_rights, CASTLE_WQ | CASTLE_BQ);
}

#[test]
fn king_moves_clear_both_rights() {
    let mut position =
        Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(position.make_move(find_move(&position, "e1e2")));
    assert_eq!(position.castling_rights, CASTLE_BK | CASTLE_BQ);
}

#[test]
fn promotion_replaces_the_pawn() {
    let mut position = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(position.make_move(find_move(&position, "a7a8q")));
    assert_eq!(position.white.pawns(), 0);
    assert_eq!(position.white.queens(), Square::A8.bb());
    assert_eq!(position.hash, position.compute_hash());
}

#[test]
fn halfmove_clock_counts_and_resets() {
    let mut position = Position::startpos();
    assert!(position.make_move(find_move(&position, "g1f3")));
    assert_eq!(position.half_move_counter, 1);
    assert!(position.make_move(find_move(&position, "b8c6")));
    assert_eq!(position.half_move_counter, 2);
    // pawn move resets
    assert!(position.make_move(find_move(&position, "e2e4")));
    assert_eq!(position.half_move_counter, 0);

    // capture resets too
    let mut position =
        Position::from_fen("4k3/8/8/3r4/8/3R4/8/4K3 w - - 37 1").unwrap();
    assert!(position.make_move(find_move(&position, "d3d5")));
    assert_eq!(position.half_move_counter, 0);
}

#[test]
fn illegal_moves_are_reported_by_make_move() {
    // the d2 rook is pinned to the king by the d8 rook; pseudo-legal rook
    // moves off the d-file must come back illegal
    let position = Position::from_fen("3rk3/8/8/8/8/8/3R4/3K4 w - - 0 1").unwrap();
    let legal = legal_moves(&position);
    assert!(legal.iter().all(|m| {
        m.to_uci().starts_with("d2d") || !m.to_uci().starts_with("d2")
    }));
    // and the legal list keeps the rook on the file
    assert!(legal.iter().any(|m| m.to_uci() == "d2d5"));
    assert!(!legal.iter().any(|m| m.to_uci() == "d2e2"));
}

#[test]
fn en_passant_discovered_check_is_illegal() {
    // exd6 e.p. would expose the white king on the fifth rank to the h5 rook
    let position = Position::from_fen("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 1").unwrap();
    let legal = legal_moves(&position);
    assert!(!legal.iter().any(|m| m.is_en_passant()));
}
