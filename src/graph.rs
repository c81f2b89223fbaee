use crate::error::{Error, Result};
use crate::index::Index;
use crate::matrix::Matrix;
use crate::topology::Topology;

/// Read-only graph view over one matrix, one root and one neighbor rule.
///
/// `adjacent` is purely positional; `reachable` additionally requires the
/// neighbor to hold a value, and is the only relation the search algorithms
/// traverse. An empty cell reaches nothing: nothing is reachable from
/// nowhere.
#[derive(Clone, Debug)]
pub struct MatrixGraph<'a, T> {
    matrix: &'a Matrix<T>,
    root: Index,
    topology: Topology,
}

impl<'a, T: Clone> MatrixGraph<'a, T> {
    /// Wraps a matrix. The root must be in bounds; its cell may be empty.
    pub fn new(matrix: &'a Matrix<T>, root: Index, topology: Topology) -> Result<Self> {
        if !matrix.in_bounds(root) {
            return Err(Error::OutOfBounds {
                index: root,
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }
        Ok(Self {
            matrix,
            root,
            topology,
        })
    }

    #[inline]
    pub fn root(&self) -> Index {
        self.root
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix<T> {
        self.matrix
    }

    /// Total number of cells backing this graph.
    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.cell_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn contains(&self, v: Index) -> bool {
        self.matrix.in_bounds(v)
    }

    /// The stored value at `v`, with an empty cell (`None`) kept distinct
    /// from a stored zero.
    pub fn value(&self, v: Index) -> Result<Option<&T>> {
        if !self.contains(v) {
            return Err(self.out_of_bounds(v));
        }
        Ok(self.matrix.get(v))
    }

    /// All in-bounds cells one topology step from `v`, valued or not.
    pub fn adjacent(&self, v: Index) -> Result<Vec<Index>> {
        if !self.contains(v) {
            return Err(self.out_of_bounds(v));
        }
        let mut out = Vec::with_capacity(self.topology.degree());
        for &offset in self.topology.offsets() {
            let next = v + offset;
            if self.matrix.in_bounds(next) {
                out.push(next);
            }
        }
        Ok(out)
    }

    /// The adjacent cells of `v` that hold a value, or nothing at all when
    /// `v` itself is empty.
    pub fn reachable(&self, v: Index) -> Result<Vec<Index>> {
        if !self.contains(v) {
            return Err(self.out_of_bounds(v));
        }
        if !self.matrix.has_value(v) {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(self.topology.degree());
        for &offset in self.topology.offsets() {
            let next = v + offset;
            if self.matrix.has_value(next) {
                out.push(next);
            }
        }
        Ok(out)
    }

    /// All cells in row-major order. O(cells); callers that enumerate
    /// repeatedly should hold on to the result for the request.
    pub fn vertices(&self) -> Vec<Index> {
        self.matrix.iter_indices().collect()
    }

    /// All ordered adjacency pairs. O(cells x degree).
    pub fn edges(&self) -> Vec<(Index, Index)> {
        let mut out = Vec::with_capacity(self.len() * self.topology.degree());
        for v in self.matrix.iter_indices() {
            for &offset in self.topology.offsets() {
                let next = v + offset;
                if self.matrix.in_bounds(next) {
                    out.push((v, next));
                }
            }
        }
        out
    }

    fn out_of_bounds(&self, v: Index) -> Error {
        Error::OutOfBounds {
            index: v,
            rows: self.matrix.rows(),
            cols: self.matrix.cols(),
        }
    }
}
