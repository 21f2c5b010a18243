//! [`Bitboard`] is the set of squares produced by the move builder: every
//! reachable-square query answers with one. Boards are at most
//! [`MAX_BOARD_WIDTH`] squares wide and high, so a single 64-bit integer covers
//! every supported grid.
//!
//! [Bitboard]: https://www.chessprogramming.org/Bitboards

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not, Sub};

use itertools::Itertools;

use crate::chess::core::{Square, MAX_BOARD_SIZE, MAX_BOARD_WIDTH};

/// Represents a set of squares and provides common operations (e.g. AND, OR,
/// difference) over these sets. Bit `rank * 8 + file` corresponds to the
/// square `(rank, file)`, so the least significant bit is the top-left corner.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct Bitboard {
    bits: u64,
}

impl Bitboard {
    /// Constructs Bitboard from pre-calculated bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Constructs a bitboard representing empty set of squares.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Returns raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    #[must_use]
    pub fn from_squares(squares: &[Square]) -> Self {
        squares
            .iter()
            .fold(Self::empty(), |result, square| result | Self::from(*square))
    }

    /// Returns true if this bitboard contains given square.
    #[must_use]
    pub const fn contains(self, square: Square) -> bool {
        (self.bits & (1u64 << square.index())) != 0
    }

    /// Adds the square to the set.
    pub fn insert(&mut self, square: Square) {
        *self |= Self::from(square);
    }

    #[must_use]
    pub const fn count(self) -> u32 {
        self.bits.count_ones()
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// An efficient way to iterate over the set squares.
    #[must_use]
    pub const fn iter(self) -> BitboardIterator {
        BitboardIterator { bits: self.bits }
    }
}

impl fmt::Debug for Bitboard {
    /// Dumps the set as an 8x8 grid, top rank first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            (0..MAX_BOARD_SIZE)
                .map(|index| {
                    if self.contains(Square::from_index(index)) {
                        '1'
                    } else {
                        '.'
                    }
                })
                .chunks(MAX_BOARD_WIDTH as usize)
                .into_iter()
                .map(|mut chunk| chunk.join(SQUARE_SEPARATOR))
                .join(LINE_SEPARATOR)
        )
    }
}

impl BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitor(rhs.bits))
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.bits.bitor_assign(rhs.bits);
    }
}

impl BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.bits.bitand(rhs.bits))
    }
}

impl Sub for Bitboard {
    type Output = Self;

    /// [Relative component], i.e. Result = LHS \ RHS.
    ///
    /// [Relative component]: https://en.wikipedia.org/wiki/Complement_%28set_theory%29#Relative_complement
    fn sub(self, rhs: Self) -> Self::Output {
        self & !rhs
    }
}

impl Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.bits)
    }
}

impl From<Square> for Bitboard {
    fn from(square: Square) -> Self {
        Self::from_bits(1u64 << square.index())
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(squares: I) -> Self {
        squares
            .into_iter()
            .fold(Self::empty(), |result, square| result | Self::from(square))
    }
}

impl IntoIterator for Bitboard {
    type IntoIter = BitboardIterator;
    type Item = Square;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates over set squares in a given [Bitboard] from least significant 1
/// bits (LS1B) to most significant 1 bits (MS1B), i.e. row by row from the
/// top-left corner.
pub struct BitboardIterator {
    bits: u64,
}

impl Iterator for BitboardIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        // Get the LS1B and consume it from the iterator.
        let next_index = self.bits.trailing_zeros();
        self.bits ^= 1 << next_index;
        // trailing_zeros() of a non-zero u64 is always in 0..64.
        u8::try_from(next_index).ok().map(Square::from_index)
    }
}

const LINE_SEPARATOR: &str = "\n";
const SQUARE_SEPARATOR: &str = " ";
