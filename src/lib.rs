//! Graph-search engine for grid-shaped matrices of binary cells.
//!
//! A [`Matrix`] stores optional values; a [`MatrixGraph`] views it as a
//! graph under a chosen [`Topology`] and answers structural queries:
//! shortest paths, exhaustive simple-path enumeration, connected
//! components, and submarine detection on top of components. A bounded
//! [`WorkerPool`] runs whole algorithm invocations as tasks so concurrent
//! requests share one capped set of threads.

pub mod components;
pub mod error;
pub mod graph;
pub mod index;
pub mod matrix;
pub mod paths;
pub mod pool;
pub mod submarines;
pub mod topology;

pub use components::components;
pub use error::{Error, Result};
pub use graph::MatrixGraph;
pub use index::Index;
pub use matrix::Matrix;
pub use paths::{
    all_paths, all_paths_cancellable, shortest_paths, shortest_paths_cancellable,
    MAX_SEARCH_CELLS,
};
pub use pool::{CancelToken, TaskHandle, WorkerPool, WORKERS_PER_CORE};
pub use submarines::submarines;
pub use topology::Topology;
