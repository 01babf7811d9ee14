//! Magic-number search. Candidates are sparse 64-bit numbers (the AND of
//! three generator draws); a candidate is accepted when the multiply-shift
//! maps every occupancy subset to a bucket whose stored attack set agrees.

use rand::RngCore;
use tracing::error;

const MAX_ATTEMPTS: u32 = 10_000_000;

/// AND-ing three draws keeps the popcount low, which is what makes a
/// multiplier likely to separate the occupancy subsets.
#[inline(always)]
pub fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

fn is_magic_valid(blockers: &[u64], attacks: &[u64], magic: u64, shift: u32) -> bool {
    let mut used = vec![0u64; 1usize << (64 - shift)];

    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if used[index] == 0 {
            used[index] = attack;
        } else if used[index] != attack {
            // two subsets with different attack sets collided
            return false;
        }
    }
    true
}

/// Searches for a perfect-hash multiplier for one square. Exhaustion after
/// ten million attempts is an engineering bug, not a runtime condition; it
/// is logged and a zero magic returned.
pub fn find_magic<R: RngCore>(
    square: usize,
    mask: u64,
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> u64 {
    for _ in 0..MAX_ATTEMPTS {
        let magic = random_sparse_u64(rng);

        // cheap rejection: the mask's high product byte must be dense
        if (mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        if is_magic_valid(blockers, attacks, magic, shift) {
            return magic;
        }
    }

    error!(square, "no magic number found after {MAX_ATTEMPTS} attempts");
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::attacks::{occupancy_subsets, rook_attacks_otf, rook_mask};
    use crate::utils::XorShiftRng;

    #[test]
    fn found_magic_is_a_perfect_hash() {
        let square = 27;
        let mask = rook_mask(square);
        let blockers = occupancy_subsets(mask);
        let attacks: Vec<u64> = blockers
            .iter()
            .map(|&b| rook_attacks_otf(square, b))
            .collect();
        let shift = 64 - mask.count_ones();

        let mut rng = XorShiftRng::new(0x1234_5678_90AB_CDEF);
        let magic = find_magic(square, mask, &blockers, &attacks, shift, &mut rng);
        assert_ne!(magic, 0);
        assert!(is_magic_valid(&blockers, &attacks, magic, shift));
    }

    #[test]
    fn sparse_draws_have_low_popcount_on_average() {
        let mut rng = XorShiftRng::new(0x9E37_79B9_97F4_A7C1);
        let total: u32 = (0..1000).map(|_| random_sparse_u64(&mut rng).count_ones()).sum();
        // expectation is 8 set bits; anything near 32 would mean the AND is gone
        assert!(total / 1000 < 16);
    }
}
