use crate::index::Index;

/// Neighbor rule deciding which offsets count as one step on the grid.
///
/// A closed set of variants with adjacency as pure data; the matrix kind is
/// picked by tag, never by runtime type lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// 4-neighbor: up, down, left, right.
    Orthogonal,
    /// 8-neighbor: orthogonal plus the four diagonals.
    Extended,
    /// Historical third grid kind. Registered separately by old callers but
    /// shares the orthogonal neighbor rule; kept as a distinct tag so those
    /// callers keep working.
    Generic,
}

/// Offsets are listed in row-major scan order so that neighbor enumeration,
/// and everything derived from it, is reproducible across runs.
const ORTHOGONAL_OFFSETS: [Index; 4] = [
    Index::new(-1, 0),
    Index::new(0, -1),
    Index::new(0, 1),
    Index::new(1, 0),
];

const EXTENDED_OFFSETS: [Index; 8] = [
    Index::new(-1, -1),
    Index::new(-1, 0),
    Index::new(-1, 1),
    Index::new(0, -1),
    Index::new(0, 1),
    Index::new(1, -1),
    Index::new(1, 0),
    Index::new(1, 1),
];

impl Topology {
    #[inline]
    pub const fn offsets(self) -> &'static [Index] {
        match self {
            Topology::Orthogonal | Topology::Generic => &ORTHOGONAL_OFFSETS,
            Topology::Extended => &EXTENDED_OFFSETS,
        }
    }

    /// Number of neighbors an interior cell has under this rule.
    #[inline]
    pub const fn degree(self) -> usize {
        self.offsets().len()
    }
}
