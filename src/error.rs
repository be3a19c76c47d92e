//! Error types for the blockheap priority queue.

use std::io;
use std::path::PathBuf;

/// The result type used throughout blockheap.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred while reading or writing a block.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The backing file could not be created or opened.
    #[error("Failed to open backing file {path:?}: {source}")]
    Open {
        /// Path that was being opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No block in the directory owns the item's value.
    ///
    /// The block ranges are meant to cover the whole `i32` domain, so this
    /// means the directory is broken.
    #[error("Coverage violation: no block owns item {0}")]
    Coverage(i32),

    /// A block holding a single repeated value is full and cannot split.
    #[error("Block full: cannot store another copy of {item} (capacity {capacity})")]
    BlockFull {
        /// The rejected item.
        item: i32,
        /// Block capacity in items.
        capacity: usize,
    },

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A directory or block invariant does not hold.
    #[error("Data corruption: {0}")]
    Corruption(String),
}

impl Error {
    /// Creates a new corruption error.
    pub fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true if the error leaves the queue unusable.
    ///
    /// Coverage violations and corruption mean the directory no longer
    /// describes the file. A full block only rejects one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Coverage(_) | Error::Corruption(_) | Error::Open { .. })
    }
}
