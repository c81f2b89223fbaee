use std::fmt;
use std::ops::{Add, Neg, Sub};

/// 2D matrix coordinate, addressed as (row, column).
///
/// The derived `Ord` sorts by row first, then column, which is the
/// enumeration order every algorithm in this crate relies on for
/// deterministic output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index {
    pub row: i32,
    pub col: i32,
}

impl Index {
    pub const ZERO: Index = Index { row: 0, col: 0 };

    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Flat offset of this index in a row-major cell buffer with `cols`
    /// columns. `None` when the index cannot belong to such a buffer.
    #[inline]
    pub fn to_flat(self, cols: u32) -> Option<usize> {
        if cols == 0 || self.row < 0 || self.col < 0 || self.col >= cols as i32 {
            return None;
        }
        Some((self.row as usize) * (cols as usize) + (self.col as usize))
    }

    #[inline]
    pub fn from_flat(flat: usize, cols: u32) -> Self {
        if cols == 0 {
            return Index::ZERO;
        }
        Self {
            row: (flat / cols as usize) as i32,
            col: (flat % cols as usize) as i32,
        }
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Add for Index {
    type Output = Index;

    fn add(self, rhs: Self) -> Self::Output {
        Index::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl Sub for Index {
    type Output = Index;

    fn sub(self, rhs: Self) -> Self::Output {
        Index::new(self.row - rhs.row, self.col - rhs.col)
    }
}

impl Neg for Index {
    type Output = Index;

    fn neg(self) -> Self::Output {
        Index::new(-self.row, -self.col)
    }
}
