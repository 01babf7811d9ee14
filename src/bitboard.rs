//! Bitboards are plain `u64`s, bit `i` = square `i` (a1 = 0, h8 = 63).
//! The extension trait adds the compass shifts and bit-scan helpers the
//! move generator and attack tables are built from.

use crate::square::{Direction, Square};

pub const FILE_A: u64 = 0x0101_0101_0101_0101;
pub const FILE_H: u64 = 0x8080_8080_8080_8080;
pub const RANK_1: u64 = 0x0000_0000_0000_00FF;
pub const RANK_2: u64 = 0x0000_0000_0000_FF00;
pub const RANK_3: u64 = 0x0000_0000_00FF_0000;
pub const RANK_6: u64 = 0x0000_FF00_0000_0000;
pub const RANK_7: u64 = 0x00FF_0000_0000_0000;
pub const RANK_8: u64 = 0xFF00_0000_0000_0000;

/// The light-squared half of the board (b1, d1, f1, h1, a2, c2, ...).
pub const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

#[inline(always)]
pub const fn file_bb(file: u8) -> u64 {
    FILE_A << file
}

#[inline(always)]
pub const fn rank_bb(rank: u8) -> u64 {
    RANK_1 << (rank * 8)
}

/// The a1-h8 diagonal through `sq`.
pub const fn diagonal_bb(sq: Square) -> u64 {
    const MAIN_DIAG: u64 = 0x8040_2010_0804_0201;
    let diag = sq.file() as i32 - sq.rank() as i32;
    if diag >= 0 {
        MAIN_DIAG >> (diag * 8)
    } else {
        MAIN_DIAG << (-diag * 8)
    }
}

/// The h1-a8 anti-diagonal through `sq`.
pub const fn anti_diagonal_bb(sq: Square) -> u64 {
    const MAIN_ANTI_DIAG: u64 = 0x0102_0408_1020_4080;
    let diag = 7 - sq.file() as i32 - sq.rank() as i32;
    if diag >= 0 {
        MAIN_ANTI_DIAG >> (diag * 8)
    } else {
        MAIN_ANTI_DIAG << (-diag * 8)
    }
}

pub trait BitboardExt {
    fn north(self) -> u64;
    fn south(self) -> u64;
    fn east(self) -> u64;
    fn west(self) -> u64;
    fn shift(self, dir: Direction) -> u64;
    fn count(self) -> u32;
    fn lsb(self) -> u8;
    fn pop_lsb(&mut self) -> u8;
    fn contains(self, sq: Square) -> bool;
}

impl BitboardExt for u64 {
    #[inline(always)]
    fn north(self) -> u64 {
        self << 8
    }

    #[inline(always)]
    fn south(self) -> u64 {
        self >> 8
    }

    // East/west shifts mask off the wrapping file.
    #[inline(always)]
    fn east(self) -> u64 {
        (self << 1) & !FILE_A
    }

    #[inline(always)]
    fn west(self) -> u64 {
        (self >> 1) & !FILE_H
    }

    #[inline]
    fn shift(self, dir: Direction) -> u64 {
        match dir {
            Direction::North => self.north(),
            Direction::East => self.east(),
            Direction::South => self.south(),
            Direction::West => self.west(),
            Direction::NorthEast => self.north().east(),
            Direction::SouthEast => self.south().east(),
            Direction::SouthWest => self.south().west(),
            Direction::NorthWest => self.north().west(),
        }
    }

    #[inline(always)]
    fn count(self) -> u32 {
        self.count_ones()
    }

    #[inline(always)]
    fn lsb(self) -> u8 {
        self.trailing_zeros() as u8
    }

    #[inline(always)]
    fn pop_lsb(&mut self) -> u8 {
        let sq = self.trailing_zeros() as u8;
        *self &= *self - 1;
        sq
    }

    #[inline(always)]
    fn contains(self, sq: Square) -> bool {
        self & sq.bb() != 0
    }
}
