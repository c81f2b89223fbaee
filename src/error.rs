use thiserror::Error;

use crate::index::Index;

/// Everything that can go wrong inside the engine. All variants are
/// recoverable request-level conditions; nothing here is fatal to the
/// process.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("vertex {index} is outside a {rows}x{cols} matrix")]
    OutOfBounds { index: Index, rows: u32, cols: u32 },

    /// Cost-control guard for the exhaustive path search, raised before any
    /// traversal work happens.
    #[error("matrix has {cells} cells, exhaustive search is capped at {limit}")]
    InputTooLarge { cells: usize, limit: usize },

    #[error("row {row} holds {got} cells, expected {expected}")]
    SizeMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// An algorithm was requested before any graph was established for the
    /// session. Raised by the request-dispatch layer, never by the
    /// algorithms themselves.
    #[error("no graph has been established for this session")]
    NoGraph,

    #[error("search was cancelled")]
    Cancelled,

    #[error("deadline elapsed before any task completed")]
    Timeout,

    /// A task panicked inside the worker pool. The fault is confined to the
    /// task's own handle; the pool and sibling tasks keep running.
    #[error("task failed: {0}")]
    TaskFailed(String),

    #[error("worker pool is shut down")]
    PoolClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
