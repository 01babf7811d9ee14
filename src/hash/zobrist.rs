//! Zobrist keys: one 64-bit key per independent position attribute. The
//! generator is a fixed-seed xorshift so hashes are reproducible across
//! runs; the tables are built once on first use.

use once_cell::sync::OnceCell;
use rand::RngCore;

use crate::utils::XorShiftRng;

const ZOBRIST_SEED: u64 = 0x0123_4567_89AB_CDEF;

pub struct ZobristKeys {
    /// [color][piece_type][square]
    pub piece: [[[u64; 64]; 6]; 2],
    /// XORed in when black is to move.
    pub side_to_move: u64,
    /// One key per file of the en-passant target square.
    pub ep_file: [u64; 8],
    /// One key per castling-rights mask.
    pub castling: [u64; 16],
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(XorShiftRng::new(ZOBRIST_SEED)))
}

fn generate_keys<R: RngCore>(mut rng: R) -> ZobristKeys {
    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        side_to_move: 0,
        ep_file: [0u64; 8],
        castling: [0u64; 16],
    };

    for color in &mut keys.piece {
        for piece in color.iter_mut() {
            for square in piece.iter_mut() {
                *square = rng.next_u64();
            }
        }
    }

    keys.side_to_move = rng.next_u64();

    for file in &mut keys.ep_file {
        *file = rng.next_u64();
    }
    for mask in &mut keys.castling {
        *mask = rng.next_u64();
    }

    keys
}
