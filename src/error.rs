//! Error taxonomy for the memory store.
//!
//! Every store operation surfaces one of these kinds so callers (MCP tools,
//! CLI) can distinguish "the record does not exist" from "the disk failed"
//! without string matching. `Io` is reserved for real IO failures — a missing
//! content file is reported through [`crate::content::ContentRead::Missing`],
//! not as an error.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// No memory row exists for the given id.
    #[error("memory not found: {0}")]
    NotFound(i64),

    /// Input rejected before any mutation was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Disk read/write failure, distinct from "file absent".
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A caller-supplied path resolves outside the configured content root.
    #[error("path outside content root: {}", .0.display())]
    PathOutsideRoot(PathBuf),

    /// An existence check and the row mutation it guarded disagreed.
    #[error("internal inconsistency: {0}")]
    Inconsistent(String),

    /// Underlying SQLite failure.
    #[error("storage error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl MemoryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
