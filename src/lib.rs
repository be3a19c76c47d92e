//! # blockheap - An External-Memory Priority Queue
//!
//! blockheap is a max-priority queue of `i32` values whose elements live in
//! fixed-size blocks of a single backing file. Only one block is held in
//! memory at a time, so memory use stays bounded no matter how many items
//! are queued.
//!
//! ## Architecture
//!
//! The queue consists of several layered components:
//!
//! - **Block Store**: Reads and writes fixed byte windows of the backing file
//! - **Block Cache**: Keeps the one resident block and writes it back on eviction
//! - **Block Directory**: Heap-ordered descriptors whose `[min, max]` ranges
//!   partition the `i32` domain; splits full blocks and restores heap order
//! - **PriorityQueue**: Ties the pieces together into enqueue and dequeue
//!
//! Every value is stored in the block whose range contains it. The root of
//! the directory heap owns the highest range, so the largest item is always
//! the last item of the root block.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use blockheap::{Options, PriorityQueue};
//!
//! # fn main() -> Result<(), blockheap::Error> {
//! // Open or create a queue with 256 items per block
//! let mut queue = PriorityQueue::open("./queue.dat", Options::new().capacity(256))?;
//!
//! for item in [4, 17, -3] {
//!     queue.enqueue(item)?;
//! }
//!
//! assert_eq!(queue.dequeue()?, Some(17));
//! assert_eq!(queue.peek()?, Some(4));
//!
//! // Flush the resident block and release the file
//! queue.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod block;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod iterator;

// Re-exports
pub use cache::CacheStats;
pub use config::Options;
pub use directory::BlockDescriptor;
pub use error::{Error, Result};
pub use iterator::Drain;

use block::BlockStore;
use directory::BlockDirectory;
use std::io::Write;
use std::path::Path;

/// The main priority queue handle.
///
/// Created by [`PriorityQueue::open`] and released by
/// [`PriorityQueue::close`]. Dropping an open queue flushes the resident
/// block on a best-effort basis.
///
/// # Thread Safety
///
/// All operations take `&mut self`. Sharing a queue across threads requires
/// external synchronization.
#[derive(Debug)]
pub struct PriorityQueue {
    /// Configuration options
    options: Options,

    /// Heap-ordered blocks, their cache and the backing file
    directory: BlockDirectory,

    /// Total number of queued items
    len: usize,
}

impl PriorityQueue {
    /// Opens a queue backed by the file at `path`.
    ///
    /// The queue always starts empty: block ranges and sizes are not stored
    /// in the file, so earlier contents cannot be recovered.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The options are invalid
    /// - The file cannot be created or opened
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use blockheap::{Options, PriorityQueue};
    ///
    /// # fn main() -> Result<(), blockheap::Error> {
    /// let queue = PriorityQueue::open("./queue.dat", Options::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        options.validate()?;

        let store = BlockStore::open(path, &options)?;
        let directory = BlockDirectory::new(store);

        log::info!(
            "Opened priority queue at {:?} ({} bytes per block, {} items)",
            directory.path(),
            options.block_size,
            directory.capacity()
        );

        Ok(Self { options, directory, len: 0 })
    }

    /// Adds an item to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Coverage`] if no block owns the item's value, which
    /// means the directory is corrupt, and [`Error::BlockFull`] if the owning
    /// block is full of copies of the same value.
    pub fn enqueue(&mut self, item: i32) -> Result<()> {
        let index = self.directory.find(item).ok_or_else(|| {
            log::error!("No block owns item {}", item);
            Error::Coverage(item)
        })?;

        self.directory.insert(index, item)?;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the largest item.
    ///
    /// Returns `Ok(None)` when the queue is empty.
    pub fn dequeue(&mut self) -> Result<Option<i32>> {
        let Some(item) = self.directory.pop_root()? else {
            log::debug!("Dequeue on empty queue");
            return Ok(None);
        };
        self.len -= 1;

        if self.directory.len() > 1 && self.directory.descriptors()[0].is_empty() {
            self.compact_root()?;
        }

        Ok(Some(item))
    }

    /// Replaces the emptied root block with the last block.
    ///
    /// The root's range passes to the block directly below it, which heap
    /// order puts at the root once the last block has sifted down.
    fn compact_root(&mut self) -> Result<()> {
        let last = self.directory.len() - 1;

        self.directory.flush()?;
        self.directory.invalidate();
        self.directory.exchange(0, last)?;
        let vacated = self.directory.move_last_to_root()?;
        self.directory.heapify(0)?;
        self.directory.absorb_into_root(vacated)?;

        log::debug!(
            "Compacted emptied root [{}, {}], {} blocks remain",
            vacated.min,
            vacated.max,
            self.directory.len()
        );

        Ok(())
    }

    /// Returns the largest item without removing it.
    pub fn peek(&mut self) -> Result<Option<i32>> {
        self.directory.peek_root()
    }

    /// Returns an iterator that dequeues every item in descending order.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain::new(self)
    }

    /// Writes the resident block back to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.directory.flush()
    }

    /// Prints every block's descriptor followed by its items.
    ///
    /// For debugging; the format is not stable.
    pub fn dump<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.directory.dump(out)
    }

    /// Checks heap order, the range partition, block capacity and the
    /// contents of every block on disk.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] describing the first violation found.
    pub fn verify(&mut self) -> Result<()> {
        self.directory.verify()?;

        let stored: usize = self.directory.descriptors().iter().map(|d| d.size).sum();
        if stored != self.len {
            return Err(Error::corruption(format!(
                "blocks hold {} items but the queue counted {}",
                stored, self.len
            )));
        }
        Ok(())
    }

    /// Closes the queue, writing the resident block back to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing or syncing fails.
    pub fn close(mut self) -> Result<()> {
        self.directory.flush()?;

        if self.options.sync_on_close {
            self.directory.sync()?;
        }

        log::info!("Priority queue at {:?} closed", self.directory.path());
        Ok(())
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the queue holds no items
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks in the directory
    pub fn block_count(&self) -> usize {
        self.directory.len()
    }

    /// Number of items one block holds
    pub fn capacity(&self) -> usize {
        self.directory.capacity()
    }

    /// Block descriptors in heap order
    pub fn descriptors(&self) -> &[BlockDescriptor] {
        self.directory.descriptors()
    }

    /// Get current cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.directory.cache_stats()
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        self.directory.path()
    }

    /// Options the queue was opened with
    pub fn options(&self) -> &Options {
        &self.options
    }
}

impl Drop for PriorityQueue {
    fn drop(&mut self) {
        // Errors cannot be propagated from drop
        if let Err(e) = self.directory.flush() {
            log::error!("Error flushing priority queue during drop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_queue(dir: &TempDir, capacity: usize) -> PriorityQueue {
        PriorityQueue::open(dir.path().join("queue.dat"), Options::new().capacity(capacity)).unwrap()
    }

    #[test]
    fn test_queue_open() {
        let temp_dir = TempDir::new().unwrap();
        let result = PriorityQueue::open(temp_dir.path().join("queue.dat"), Options::default());
        assert!(result.is_ok());

        let queue = result.unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.block_count(), 1);
        assert_eq!(queue.capacity(), 2048);
    }

    #[test]
    fn test_queue_open_invalid_options() {
        let temp_dir = TempDir::new().unwrap();
        let result = PriorityQueue::open(temp_dir.path().join("queue.dat"), Options::new().block_size(6));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_queue_open_failure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("no_such_dir").join("queue.dat");

        let result = PriorityQueue::open(&path, Options::default());
        assert!(matches!(result, Err(Error::Open { .. })));
    }

    #[test]
    fn test_queue_enqueue_dequeue() {
        let temp_dir = TempDir::new().unwrap();
        let mut queue = open_queue(&temp_dir, 4);

        for item in [2, 8, 5] {
            queue.enqueue(item).unwrap();
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.dequeue().unwrap(), Some(8));
        assert_eq!(queue.dequeue().unwrap(), Some(5));
        assert_eq!(queue.dequeue().unwrap(), Some(2));
        assert_eq!(queue.dequeue().unwrap(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_underflow_on_fresh_queue() {
        let temp_dir = TempDir::new().unwrap();
        let mut queue = open_queue(&temp_dir, 4);

        assert_eq!(queue.dequeue().unwrap(), None);
        assert_eq!(queue.peek().unwrap(), None);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_queue_peek() {
        let temp_dir = TempDir::new().unwrap();
        let mut queue = open_queue(&temp_dir, 4);

        queue.enqueue(10).unwrap();
        queue.enqueue(30).unwrap();
        queue.enqueue(20).unwrap();

        assert_eq!(queue.peek().unwrap(), Some(30));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dequeue().unwrap(), Some(30));
        assert_eq!(queue.peek().unwrap(), Some(20));
    }

    #[test]
    fn test_queue_refill_after_drain() {
        let temp_dir = TempDir::new().unwrap();
        let mut queue = open_queue(&temp_dir, 4);

        for item in 0..20 {
            queue.enqueue(item).unwrap();
        }
        while queue.dequeue().unwrap().is_some() {}
        assert_eq!(queue.block_count(), 1);

        // The surviving block owns the whole domain again
        queue.enqueue(i32::MAX).unwrap();
        queue.enqueue(i32::MIN).unwrap();
        queue.verify().unwrap();
        assert_eq!(queue.dequeue().unwrap(), Some(i32::MAX));
        assert_eq!(queue.dequeue().unwrap(), Some(i32::MIN));
    }

    #[test]
    fn test_queue_close() {
        let temp_dir = TempDir::new().unwrap();
        let mut queue = open_queue(&temp_dir, 4);

        queue.enqueue(1).unwrap();
        let result = queue.close();
        assert!(result.is_ok());
    }

    #[test]
    fn test_queue_close_writes_resident_block() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.dat");

        let mut queue = PriorityQueue::open(&path, Options::new().capacity(4)).unwrap();
        queue.enqueue(3).unwrap();
        queue.enqueue(1).unwrap();
        queue.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(block::decode_items(&bytes[..8]), vec![1, 3]);
    }

    #[test]
    fn test_queue_drop_flushes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("queue.dat");

        {
            let mut queue = PriorityQueue::open(&path, Options::new().capacity(4)).unwrap();
            queue.enqueue(-7).unwrap();
        }

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(block::decode_items(&bytes[..4]), vec![-7]);
    }

    #[test]
    fn test_queue_verify_counts_items() {
        let temp_dir = TempDir::new().unwrap();
        let mut queue = open_queue(&temp_dir, 4);

        for item in [5, 1, 9, 9, 3, 7, 2] {
            queue.enqueue(item).unwrap();
            queue.verify().unwrap();
        }
        queue.dequeue().unwrap();
        queue.verify().unwrap();
    }
}
