//! Submarine classifier on top of the component scan.
//!
//! A component is submarine-shaped when its cells exactly fill their
//! bounding rectangle and there are at least two of them: straight lines
//! and full rectangles qualify, blobs and bent shapes do not.
//!
//! Spacing policy: violations are filtered, not reported as errors. Any
//! component that touches another component, orthogonally or diagonally, is
//! excluded from the result even if its own shape is valid, because two
//! submarines must be separated by at least one empty cell in every
//! direction.

use crate::error::Result;
use crate::graph::MatrixGraph;
use crate::index::Index;

use crate::components::components;

/// The components of `graph` that satisfy the submarine shape and spacing
/// rules, in component-scan order.
pub fn submarines<T: Clone>(graph: &MatrixGraph<'_, T>) -> Result<Vec<Vec<Index>>> {
    let parts = components(graph)?;
    let cols = graph.matrix().cols();

    // Owner map over the flat cell buffer, for the spacing check.
    let mut owner: Vec<Option<usize>> = vec![None; graph.len()];
    for (id, component) in parts.iter().enumerate() {
        for cell in component {
            if let Some(flat) = cell.to_flat(cols) {
                owner[flat] = Some(id);
            }
        }
    }

    let mut isolated = vec![true; parts.len()];
    for (id, component) in parts.iter().enumerate() {
        for &cell in component {
            for neighbor in chebyshev_ring(cell) {
                if !graph.matrix().in_bounds(neighbor) {
                    continue;
                }
                let flat = match neighbor.to_flat(cols) {
                    Some(flat) => flat,
                    None => continue,
                };
                if let Some(other) = owner[flat] {
                    if other != id {
                        isolated[id] = false;
                        isolated[other] = false;
                    }
                }
            }
        }
    }

    Ok(parts
        .into_iter()
        .enumerate()
        .filter(|(id, component)| isolated[*id] && is_submarine_shape(component))
        .map(|(_, component)| component)
        .collect())
}

/// Shape rule: at least two cells, and the cells exactly fill their
/// bounding rectangle.
fn is_submarine_shape(cells: &[Index]) -> bool {
    if cells.len() < 2 {
        return false;
    }
    let mut min = cells[0];
    let mut max = cells[0];
    for cell in cells {
        min.row = min.row.min(cell.row);
        min.col = min.col.min(cell.col);
        max.row = max.row.max(cell.row);
        max.col = max.col.max(cell.col);
    }
    let area = (max.row - min.row + 1) as usize * (max.col - min.col + 1) as usize;
    area == cells.len()
}

/// The eight cells surrounding `at`, bounds unchecked.
fn chebyshev_ring(at: Index) -> [Index; 8] {
    [
        at + Index::new(-1, -1),
        at + Index::new(-1, 0),
        at + Index::new(-1, 1),
        at + Index::new(0, -1),
        at + Index::new(0, 1),
        at + Index::new(1, -1),
        at + Index::new(1, 0),
        at + Index::new(1, 1),
    ]
}
