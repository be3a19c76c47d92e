//! Configuration options for opening a priority queue.

use crate::block::{DEFAULT_BLOCK_SIZE, ITEM_WIDTH};

/// Smallest block capacity (in items) that can still be split in two.
pub const MIN_CAPACITY: usize = 2;

/// Configuration options for opening a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Size of one block in bytes. Must be a multiple of the item width.
    /// Default: 8KB
    pub block_size: usize,

    /// Create the backing file if it doesn't exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Truncate an existing backing file on open.
    ///
    /// Block ranges are not stored in the file, so leftover contents are
    /// never read back either way.
    /// Default: false
    pub truncate: bool,

    /// Sync the backing file to disk on close.
    /// Default: true
    pub sync_on_close: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            create_if_missing: true,
            truncate: false,
            sync_on_close: true,
        }
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block size in bytes.
    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    /// Sets the block size from a capacity in items.
    pub fn capacity(mut self, items: usize) -> Self {
        self.block_size = items * ITEM_WIDTH;
        self
    }

    /// Sets whether to create the backing file if it doesn't exist.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to truncate an existing backing file.
    pub fn truncate(mut self, value: bool) -> Self {
        self.truncate = value;
        self
    }

    /// Sets whether to sync the backing file on close.
    pub fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Number of items one block holds.
    pub fn block_capacity(&self) -> usize {
        self.block_size / ITEM_WIDTH
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.block_size == 0 {
            return Err(crate::Error::invalid_argument("block_size must be > 0"));
        }
        if self.block_size % ITEM_WIDTH != 0 {
            return Err(crate::Error::invalid_argument(format!(
                "block_size must be a multiple of {} bytes, got {}",
                ITEM_WIDTH, self.block_size
            )));
        }
        if self.block_capacity() < MIN_CAPACITY {
            return Err(crate::Error::invalid_argument(format!(
                "block must hold at least {} items, got {}",
                MIN_CAPACITY,
                self.block_capacity()
            )));
        }
        Ok(())
    }
}
