//! Root-to-target path search over the reachable relation.
//!
//! Two operations: a breadth-first search that reconstructs every tied
//! shortest path, and an exhaustive depth-first enumeration of all simple
//! paths. Both are pure functions of the graph; neither touches the matrix.

use crate::error::{Error, Result};
use crate::graph::MatrixGraph;
use crate::index::Index;
use crate::pool::CancelToken;

/// Cell-count ceiling for the exhaustive search (50 x 50). Anything larger
/// is rejected before traversal starts, since the enumeration is worst-case
/// exponential in the reachable-vertex count.
pub const MAX_SEARCH_CELLS: usize = 2500;

const UNDISCOVERED: u32 = u32::MAX;

/// Every shortest path from the root to `target`, as vertex sequences over
/// valued cells only. Empty when the target is unreached, and empty by
/// definition when the target is the root itself.
pub fn shortest_paths<T: Clone>(
    graph: &MatrixGraph<'_, T>,
    target: Index,
) -> Result<Vec<Vec<Index>>> {
    shortest_paths_cancellable(graph, target, &CancelToken::new())
}

/// [`shortest_paths`] with a cancellation check per BFS layer.
pub fn shortest_paths_cancellable<T: Clone>(
    graph: &MatrixGraph<'_, T>,
    target: Index,
    token: &CancelToken,
) -> Result<Vec<Vec<Index>>> {
    let target_flat = require_in_bounds(graph, target)?;
    let root = graph.root();
    if target == root {
        return Ok(Vec::new());
    }
    let cols = graph.matrix().cols();
    let root_flat = match root.to_flat(cols) {
        Some(flat) => flat,
        None => return Ok(Vec::new()),
    };

    // Distance plus the complete set of minimal-distance predecessors per
    // vertex, so reconstruction can emit every tied path.
    let mut distance = vec![UNDISCOVERED; graph.len()];
    let mut predecessors: Vec<Vec<u32>> = vec![Vec::new(); graph.len()];
    distance[root_flat] = 0;
    let mut frontier = vec![root];

    while !frontier.is_empty() {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut next = Vec::new();
        for &v in &frontier {
            let v_flat = match v.to_flat(cols) {
                Some(flat) => flat,
                None => continue,
            };
            let layer = distance[v_flat] + 1;
            for u in graph.reachable(v)? {
                let u_flat = match u.to_flat(cols) {
                    Some(flat) => flat,
                    None => continue,
                };
                if distance[u_flat] == UNDISCOVERED {
                    distance[u_flat] = layer;
                    predecessors[u_flat].push(v_flat as u32);
                    next.push(u);
                } else if distance[u_flat] == layer {
                    predecessors[u_flat].push(v_flat as u32);
                }
            }
        }
        frontier = next;
    }

    if distance[target_flat] == UNDISCOVERED {
        return Ok(Vec::new());
    }
    Ok(build_paths(&predecessors, root_flat, target_flat, cols))
}

/// Every simple path from the root to `target`. Worst-case exponential:
/// matrices above [`MAX_SEARCH_CELLS`] cells are rejected up front with
/// [`Error::InputTooLarge`].
pub fn all_paths<T: Clone>(graph: &MatrixGraph<'_, T>, target: Index) -> Result<Vec<Vec<Index>>> {
    all_paths_cancellable(graph, target, &CancelToken::new())
}

/// [`all_paths`] with a cancellation check per backtracking step.
pub fn all_paths_cancellable<T: Clone>(
    graph: &MatrixGraph<'_, T>,
    target: Index,
    token: &CancelToken,
) -> Result<Vec<Vec<Index>>> {
    if graph.len() > MAX_SEARCH_CELLS {
        return Err(Error::InputTooLarge {
            cells: graph.len(),
            limit: MAX_SEARCH_CELLS,
        });
    }
    let target_flat = require_in_bounds(graph, target)?;
    let root = graph.root();
    if target == root {
        return Ok(Vec::new());
    }
    let cols = graph.matrix().cols();
    let root_flat = match root.to_flat(cols) {
        Some(flat) => flat,
        None => return Ok(Vec::new()),
    };

    // Depth-first backtracking with an explicit frame stack. Each vertex is
    // visited at most once per path; cross-path revisits are fine.
    struct Frame {
        at: Index,
        neighbors: Vec<Index>,
        cursor: usize,
    }

    let mut paths = Vec::new();
    let mut visited = vec![false; graph.len()];
    visited[root_flat] = true;
    let mut stack = vec![Frame {
        at: root,
        neighbors: graph.reachable(root)?,
        cursor: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if frame.cursor < frame.neighbors.len() {
            let next = frame.neighbors[frame.cursor];
            frame.cursor += 1;
            let next_flat = match next.to_flat(cols) {
                Some(flat) => flat,
                None => continue,
            };
            if visited[next_flat] {
                continue;
            }
            if next_flat == target_flat {
                // A simple path ends at the target; record and keep
                // scanning this frame's remaining neighbors.
                let mut path: Vec<Index> = stack.iter().map(|f| f.at).collect();
                path.push(next);
                paths.push(path);
                continue;
            }
            visited[next_flat] = true;
            let neighbors = graph.reachable(next)?;
            stack.push(Frame {
                at: next,
                neighbors,
                cursor: 0,
            });
        } else {
            let done = match stack.pop() {
                Some(frame) => frame,
                None => break,
            };
            if let Some(flat) = done.at.to_flat(cols) {
                visited[flat] = false;
            }
        }
    }
    Ok(paths)
}

/// Walks backward from the target through the recorded predecessor sets,
/// emitting every distinct root-to-target sequence of minimal length.
fn build_paths(
    predecessors: &[Vec<u32>],
    root_flat: usize,
    target_flat: usize,
    cols: u32,
) -> Vec<Vec<Index>> {
    let mut paths = Vec::new();
    let mut trail = vec![target_flat];
    let mut cursor = vec![0usize];

    while let Some(&current) = trail.last() {
        if current == root_flat {
            paths.push(
                trail
                    .iter()
                    .rev()
                    .map(|&flat| Index::from_flat(flat, cols))
                    .collect(),
            );
            trail.pop();
            cursor.pop();
            continue;
        }
        let depth = trail.len() - 1;
        let preds = &predecessors[current];
        if cursor[depth] < preds.len() {
            let pred = preds[cursor[depth]] as usize;
            cursor[depth] += 1;
            trail.push(pred);
            cursor.push(0);
        } else {
            trail.pop();
            cursor.pop();
        }
    }
    paths
}

fn require_in_bounds<T: Clone>(graph: &MatrixGraph<'_, T>, target: Index) -> Result<usize> {
    if !graph.contains(target) {
        return Err(Error::OutOfBounds {
            index: target,
            rows: graph.matrix().rows(),
            cols: graph.matrix().cols(),
        });
    }
    match target.to_flat(graph.matrix().cols()) {
        Some(flat) => Ok(flat),
        None => Err(Error::OutOfBounds {
            index: target,
            rows: graph.matrix().rows(),
            cols: graph.matrix().cols(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;
    use crate::topology::Topology;

    fn sort_paths(mut paths: Vec<Vec<Index>>) -> Vec<Vec<Index>> {
        paths.sort();
        paths
    }

    fn orthogonal(matrix: &Matrix<u8>, root: Index) -> MatrixGraph<'_, u8> {
        MatrixGraph::new(matrix, root, Topology::Orthogonal).unwrap()
    }

    fn extended(matrix: &Matrix<u8>, root: Index) -> MatrixGraph<'_, u8> {
        MatrixGraph::new(matrix, root, Topology::Extended).unwrap()
    }

    #[test]
    fn shortest_no_path_when_target_cut_off() {
        let m = Matrix::from_binary(&[
            &[1, 1, 1, 1, 0],
            &[1, 1, 0, 0, 1],
            &[1, 0, 1, 0, 1],
            &[1, 1, 0, 1, 1],
            &[1, 1, 1, 1, 1],
        ])
        .unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        assert!(shortest_paths(&g, Index::new(2, 2)).unwrap().is_empty());
        assert!(all_paths(&g, Index::new(2, 2)).unwrap().is_empty());
    }

    #[test]
    fn shortest_two_tied_paths_out_of_three() {
        let m = Matrix::from_binary(&[
            &[1, 1, 1, 1, 0],
            &[1, 0, 1, 0, 1],
            &[1, 1, 1, 1, 1],
            &[1, 0, 1, 0, 1],
            &[1, 1, 1, 0, 1],
        ])
        .unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        let paths = sort_paths(shortest_paths(&g, Index::new(2, 2)).unwrap());
        assert_eq!(
            paths,
            vec![
                vec![
                    Index::new(0, 0),
                    Index::new(0, 1),
                    Index::new(0, 2),
                    Index::new(1, 2),
                    Index::new(2, 2)
                ],
                vec![
                    Index::new(0, 0),
                    Index::new(1, 0),
                    Index::new(2, 0),
                    Index::new(2, 1),
                    Index::new(2, 2)
                ],
            ]
        );
    }

    #[test]
    fn shortest_single_path_with_diagonal_steps() {
        let m = Matrix::from_binary(&[
            &[1, 1, 1, 1, 0],
            &[1, 0, 0, 0, 1],
            &[1, 0, 1, 0, 1],
            &[1, 0, 1, 0, 1],
            &[1, 1, 1, 1, 1],
        ])
        .unwrap();
        let g = extended(&m, Index::new(0, 0));
        let paths = shortest_paths(&g, Index::new(2, 2)).unwrap();
        assert_eq!(
            paths,
            vec![vec![
                Index::new(0, 0),
                Index::new(1, 0),
                Index::new(2, 0),
                Index::new(3, 0),
                Index::new(4, 1),
                Index::new(3, 2),
                Index::new(2, 2)
            ]]
        );
    }

    #[test]
    fn shortest_target_equals_root_is_empty() {
        let m = Matrix::from_binary(&[&[1, 1], &[1, 1]]).unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        assert!(shortest_paths(&g, Index::new(0, 0)).unwrap().is_empty());
        assert!(all_paths(&g, Index::new(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn shortest_empty_root_reaches_nothing() {
        let m = Matrix::from_binary(&[&[0, 1], &[1, 1]]).unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        assert!(shortest_paths(&g, Index::new(1, 1)).unwrap().is_empty());
        assert!(all_paths(&g, Index::new(1, 1)).unwrap().is_empty());
    }

    #[test]
    fn shortest_rejects_out_of_range_target() {
        let m = Matrix::from_binary(&[&[1, 1], &[1, 1]]).unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        assert!(matches!(
            shortest_paths(&g, Index::new(2, 0)),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            all_paths(&g, Index::new(0, -1)),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn all_paths_enumerates_every_simple_path() {
        let m = Matrix::from_binary(&[
            &[1, 1, 1, 1, 0],
            &[1, 0, 1, 0, 1],
            &[1, 1, 1, 1, 1],
            &[1, 0, 1, 0, 1],
            &[1, 1, 1, 0, 1],
        ])
        .unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        let all = sort_paths(all_paths(&g, Index::new(2, 2)).unwrap());
        assert_eq!(all.len(), 3);
        // Every shortest path appears among the exhaustive ones.
        for path in shortest_paths(&g, Index::new(2, 2)).unwrap() {
            assert!(all.contains(&path));
        }
        // No duplicates and every path is simple.
        for path in &all {
            let mut dedup = path.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), path.len());
        }
    }

    #[test]
    fn all_paths_guard_rejects_oversized_matrix() {
        let m = Matrix::<u8>::new(51, 51);
        let g = orthogonal(&m, Index::new(0, 0));
        assert_eq!(
            all_paths(&g, Index::new(3, 3)),
            Err(Error::InputTooLarge {
                cells: 2601,
                limit: MAX_SEARCH_CELLS
            })
        );
    }

    #[test]
    fn guard_is_inclusive_at_the_ceiling() {
        let m = Matrix::<u8>::new(50, 50);
        let g = orthogonal(&m, Index::new(0, 0));
        // 2500 cells is allowed; the all-empty matrix yields no paths.
        assert!(all_paths(&g, Index::new(3, 3)).unwrap().is_empty());
    }

    #[test]
    fn cancellation_stops_the_search() {
        let m = Matrix::from_binary(&[&[1, 1, 1], &[1, 1, 1], &[1, 1, 1]]).unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            shortest_paths_cancellable(&g, Index::new(2, 2), &token),
            Err(Error::Cancelled)
        );
        assert_eq!(
            all_paths_cancellable(&g, Index::new(2, 2), &token),
            Err(Error::Cancelled)
        );
    }

    #[test]
    fn all_shortest_paths_share_minimal_length() {
        let m = Matrix::from_binary(&[
            &[1, 1, 1],
            &[1, 0, 1],
            &[1, 1, 1],
        ])
        .unwrap();
        let g = orthogonal(&m, Index::new(0, 0));
        let paths = shortest_paths(&g, Index::new(2, 2)).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 5));
    }
}
