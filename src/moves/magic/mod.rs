//! Magic bitboards: O(1) sliding-piece attack lookups via a per-square
//! perfect hash of the relevant occupancy. Tables are generated once, on
//! first use, from a fixed-seed generator, so every run agrees.

pub mod attacks;
pub mod loader;
pub mod search;
pub mod structs;

use once_cell::sync::OnceCell;

pub use structs::{MagicEntry, MagicTables, SliderAttacks};

use crate::utils::XorShiftRng;
use attacks::{bishop_attacks_otf, bishop_mask, occupancy_subsets, rook_attacks_otf, rook_mask};
use search::find_magic;

const MAGIC_SEED: u64 = 0x1234_5678_90AB_CDEF;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SlidingPiece {
    Rook,
    Bishop,
}

fn build_slider(piece: SlidingPiece) -> SliderAttacks {
    let mut entries = Vec::with_capacity(64);

    for square in 0..64usize {
        let mask = match piece {
            SlidingPiece::Rook => rook_mask(square),
            SlidingPiece::Bishop => bishop_mask(square),
        };
        let blockers = occupancy_subsets(mask);
        let attack_sets: Vec<u64> = blockers
            .iter()
            .map(|&b| match piece {
                SlidingPiece::Rook => rook_attacks_otf(square, b),
                SlidingPiece::Bishop => bishop_attacks_otf(square, b),
            })
            .collect();
        let shift = 64 - mask.count_ones();

        let mut rng = XorShiftRng::new(MAGIC_SEED);
        let magic = find_magic(square, mask, &blockers, &attack_sets, shift, &mut rng);

        let mut table = vec![0u64; 1usize << mask.count_ones()];
        for (&blocker, &attack) in blockers.iter().zip(&attack_sets) {
            let index = (blocker.wrapping_mul(magic) >> shift) as usize;
            table[index] = attack;
        }

        entries.push(MagicEntry {
            magic,
            shift,
            mask,
            table: table.into_boxed_slice(),
        });
    }

    SliderAttacks { entries }
}

pub fn generate_magic_tables() -> MagicTables {
    MagicTables {
        rook: build_slider(SlidingPiece::Rook),
        bishop: build_slider(SlidingPiece::Bishop),
    }
}

fn load_or_generate() -> MagicTables {
    #[cfg(feature = "load_magic")]
    if let Ok(tables) = loader::load_from_file(loader::DEFAULT_CACHE_PATH) {
        return tables;
    }

    let tables = generate_magic_tables();
    #[cfg(feature = "load_magic")]
    let _ = loader::save_to_file(&tables, loader::DEFAULT_CACHE_PATH);
    tables
}

/// Global attack tables, initialised on first use. With the `load_magic`
/// feature a bincode cache is tried first and refreshed after generation.
pub fn attack_tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(load_or_generate)
}

#[inline(always)]
pub fn rook_attacks(square: u8, occupied: u64) -> u64 {
    attack_tables().rook.attacks(square, occupied)
}

#[inline(always)]
pub fn bishop_attacks(square: u8, occupied: u64) -> u64 {
    attack_tables().bishop.attacks(square, occupied)
}

#[inline(always)]
pub fn queen_attacks(square: u8, occupied: u64) -> u64 {
    attack_tables().queen_attacks(square, occupied)
}
