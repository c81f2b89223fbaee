use rand::Rng;

use crate::error::{Error, Result};
use crate::index::Index;

/// Rectangular store of optional values, backed by a flat row-major `Vec`.
///
/// Each cell either holds a value or is empty; `None` is "no value", which
/// is distinct from a stored zero. Dimensions are fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix<T> {
    cells: Vec<Option<T>>,
    rows: u32,
    cols: u32,
}

impl<T: Clone> Matrix<T> {
    /// A rows x cols matrix with every cell empty.
    pub fn new(rows: u32, cols: u32) -> Self {
        let len = rows as usize * cols as usize;
        Self {
            cells: vec![None; len],
            rows,
            cols,
        }
    }

    /// Builds a matrix from row vectors. Every row must have the same
    /// length as the first one.
    pub fn from_rows(rows: Vec<Vec<Option<T>>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (row, data) in rows.iter().enumerate() {
            if data.len() != cols {
                return Err(Error::SizeMismatch {
                    row,
                    expected: cols,
                    got: data.len(),
                });
            }
            cells.extend(data.iter().cloned());
        }
        Ok(Self {
            rows: rows.len() as u32,
            cols: cols as u32,
            cells,
        })
    }

    #[inline]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells, empty or not.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn in_bounds(&self, at: Index) -> bool {
        at.row >= 0
            && at.col >= 0
            && at.row < self.rows as i32
            && at.col < self.cols as i32
    }

    /// The stored value, or `None` for an empty or out-of-bounds cell.
    pub fn get(&self, at: Index) -> Option<&T> {
        self.flat(at).and_then(|i| self.cells[i].as_ref())
    }

    #[inline]
    pub fn has_value(&self, at: Index) -> bool {
        self.get(at).is_some()
    }

    /// Stores a value (or clears the cell with `None`). Out-of-bounds
    /// writes fail rather than being silently dropped.
    pub fn set(&mut self, at: Index, value: Option<T>) -> Result<()> {
        match self.flat(at) {
            Some(i) => {
                self.cells[i] = value;
                Ok(())
            }
            None => Err(Error::OutOfBounds {
                index: at,
                rows: self.rows,
                cols: self.cols,
            }),
        }
    }

    /// All cell indexes in row-major order.
    pub fn iter_indices(&self) -> impl Iterator<Item = Index> + '_ {
        (0..self.cells.len()).map(move |i| Index::from_flat(i, self.cols))
    }

    #[inline]
    fn flat(&self, at: Index) -> Option<usize> {
        if !self.in_bounds(at) {
            return None;
        }
        at.to_flat(self.cols)
    }
}

impl Matrix<u8> {
    /// Binary matrix from rows of 0/1 literals; zero becomes an empty cell.
    /// This is the shape client-submitted matrices arrive in.
    pub fn from_binary(rows: &[&[u8]]) -> Result<Self> {
        Self::from_rows(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|&cell| if cell == 0 { None } else { Some(1u8) })
                        .collect()
                })
                .collect(),
        )
    }

    /// Random binary matrix where each cell holds a value with probability
    /// `fill`. The RNG is injected so generation is reproducible.
    pub fn random_binary(rows: u32, cols: u32, fill: f64, rng: &mut impl Rng) -> Self {
        let fill = fill.clamp(0.0, 1.0);
        let mut matrix = Self::new(rows, cols);
        for i in 0..matrix.cells.len() {
            if rng.gen_bool(fill) {
                matrix.cells[i] = Some(1);
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn matrix_new_is_empty() {
        let m = Matrix::<u8>::new(3, 2);
        assert_eq!(m.cell_count(), 6);
        assert!(m.iter_indices().all(|at| !m.has_value(at)));
    }

    #[test]
    fn matrix_set_get() {
        let mut m = Matrix::new(2, 2);
        m.set(Index::new(1, 0), Some(7)).unwrap();
        assert_eq!(m.get(Index::new(1, 0)), Some(&7));
        m.set(Index::new(1, 0), None).unwrap();
        assert_eq!(m.get(Index::new(1, 0)), None);
    }

    #[test]
    fn matrix_set_out_of_bounds() {
        let mut m = Matrix::new(2, 2);
        let err = m.set(Index::new(2, 0), Some(1)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { .. }));
    }

    #[test]
    fn matrix_zero_value_is_not_empty() {
        let mut m = Matrix::new(1, 1);
        m.set(Index::ZERO, Some(0)).unwrap();
        assert_eq!(m.get(Index::ZERO), Some(&0));
        assert!(m.has_value(Index::ZERO));
    }

    #[test]
    fn matrix_from_rows_ragged() {
        let err = Matrix::from_rows(vec![vec![Some(1), None], vec![Some(1)]]).unwrap_err();
        assert_eq!(
            err,
            Error::SizeMismatch {
                row: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn matrix_from_binary() {
        let m = Matrix::from_binary(&[&[1, 0], &[0, 1]]).unwrap();
        assert!(m.has_value(Index::new(0, 0)));
        assert!(!m.has_value(Index::new(0, 1)));
        assert!(m.has_value(Index::new(1, 1)));
    }

    #[test]
    fn matrix_iter_indices_row_major() {
        let m = Matrix::<u8>::new(2, 2);
        let indexes: Vec<Index> = m.iter_indices().collect();
        assert_eq!(
            indexes,
            vec![
                Index::new(0, 0),
                Index::new(0, 1),
                Index::new(1, 0),
                Index::new(1, 1)
            ]
        );
    }

    #[test]
    fn matrix_random_binary_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty = Matrix::random_binary(4, 4, 0.0, &mut rng);
        assert!(empty.iter_indices().all(|at| !empty.has_value(at)));
        let full = Matrix::random_binary(4, 4, 1.0, &mut rng);
        assert!(full.iter_indices().all(|at| full.has_value(at)));
    }

    #[test]
    fn matrix_random_binary_reproducible() {
        let a = Matrix::random_binary(6, 6, 0.5, &mut StdRng::seed_from_u64(42));
        let b = Matrix::random_binary(6, 6, 0.5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
