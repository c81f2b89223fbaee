//! Connected-component scan over the reachable relation.

use crate::error::Result;
use crate::graph::MatrixGraph;
use crate::index::Index;

/// Partitions the valued cells into maximal connected components.
///
/// Cells are scanned in row-major order and each unvisited valued cell
/// seeds a traversal, so component membership and enumeration order are
/// identical across runs on the same input. Each component comes back
/// sorted by (row, column).
pub fn components<T: Clone>(graph: &MatrixGraph<'_, T>) -> Result<Vec<Vec<Index>>> {
    let cols = graph.matrix().cols();
    let mut visited = vec![false; graph.len()];
    let mut out = Vec::new();

    for anchor in graph.matrix().iter_indices() {
        let anchor_flat = match anchor.to_flat(cols) {
            Some(flat) => flat,
            None => continue,
        };
        if visited[anchor_flat] || !graph.matrix().has_value(anchor) {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![anchor];
        visited[anchor_flat] = true;
        while let Some(v) = stack.pop() {
            component.push(v);
            for u in graph.reachable(v)? {
                if let Some(u_flat) = u.to_flat(cols) {
                    if !visited[u_flat] {
                        visited[u_flat] = true;
                        stack.push(u);
                    }
                }
            }
        }
        component.sort_unstable();
        out.push(component);
    }
    Ok(out)
}
