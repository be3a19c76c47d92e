//! Single-slot write-back cache for block contents.
//!
//! Exactly one block can be resident at a time. Switching to another block
//! writes the resident one back first if it was modified.

use crate::block::BlockStore;
use crate::error::{Error, Result};

/// Statistics for cache performance monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of activations
    pub activations: u64,
    /// Activations that found the block already resident
    pub hits: u64,
    /// Blocks read from the store
    pub loads: u64,
    /// Blocks written back to the store
    pub flushes: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        if self.activations == 0 {
            0.0
        } else {
            self.hits as f64 / self.activations as f64
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Holds the decoded items of at most one block.
///
/// `items` is always the valid prefix of the resident block, so its length
/// matches that block's descriptor size. Mutations are only meaningful while
/// the block they target is the active one.
#[derive(Debug)]
pub struct BlockCache {
    /// Block capacity in items
    capacity: usize,
    /// Index of the resident block
    active: Option<usize>,
    /// Items of the resident block, ascending
    items: Vec<i32>,
    /// Resident items differ from what the store holds
    dirty: bool,
    /// Cache statistics
    stats: CacheStats,
}

impl BlockCache {
    /// Create an empty cache for blocks of `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active: None,
            // One spare slot for the item that triggers a split
            items: Vec::with_capacity(capacity + 1),
            dirty: false,
            stats: CacheStats::default(),
        }
    }

    /// Make block `index` resident, keeping its first `len` items.
    ///
    /// Flushes the current block first if a different one is resident.
    pub fn activate(&mut self, store: &mut BlockStore, index: usize, len: usize) -> Result<()> {
        self.stats.activations += 1;

        if self.active == Some(index) {
            debug_assert_eq!(self.items.len(), len, "resident block {} out of sync", index);
            self.stats.hits += 1;
            return Ok(());
        }

        self.flush(store)?;

        let mut items = store.read(index)?;
        items.truncate(len);
        self.items = items;
        self.active = Some(index);
        self.dirty = false;
        self.stats.loads += 1;

        log::trace!("Loaded block {} ({} items)", index, len);
        Ok(())
    }

    /// Insert `item` in ascending position and return where it went.
    ///
    /// Equal items are placed after the existing ones. The caller checks
    /// capacity afterwards.
    pub fn insert_sorted(&mut self, item: i32) -> usize {
        debug_assert!(self.active.is_some(), "insert into inactive cache");
        let pos = self.items.partition_point(|&x| x <= item);
        self.items.insert(pos, item);
        self.dirty = true;
        pos
    }

    /// Remove the item at `pos`, undoing an insertion.
    pub fn remove(&mut self, pos: usize) -> i32 {
        self.dirty = true;
        self.items.remove(pos)
    }

    /// Remove and return the largest resident item.
    pub fn pop_last(&mut self) -> Option<i32> {
        // Shrinking leaves the persisted prefix untouched, so nothing to
        // write back.
        self.items.pop()
    }

    /// The largest resident item.
    pub fn last(&self) -> Option<i32> {
        self.items.last().copied()
    }

    /// Write the resident block back to its own index if modified.
    pub fn flush(&mut self, store: &mut BlockStore) -> Result<()> {
        if let Some(index) = self.active {
            if self.dirty {
                store.write_prefix(index, &self.items)?;
                self.dirty = false;
                self.stats.flushes += 1;
                log::trace!("Flushed block {} ({} items)", index, self.items.len());
            }
        }
        Ok(())
    }

    /// Write the resident items to block `index`, whatever is active.
    ///
    /// Used while exchanging two blocks, when the resident content already
    /// belongs at `index` but the slot is still bound elsewhere.
    pub fn flush_to(&mut self, store: &mut BlockStore, index: usize) -> Result<()> {
        store.write_prefix(index, &self.items)?;
        self.stats.flushes += 1;
        log::trace!("Flushed {} resident items to block {}", self.items.len(), index);
        Ok(())
    }

    /// Bind the slot to `index` with staged content.
    ///
    /// The previous content is discarded without a flush.
    pub fn replace(&mut self, index: usize, items: Vec<i32>) {
        debug_assert!(items.len() <= self.capacity);
        self.items = items;
        self.active = Some(index);
        self.dirty = true;
    }

    /// Split the resident block at `at`.
    ///
    /// `items[..at]` is written back to the resident index. `items[at..]`
    /// stays resident, moved to the front and bound to `index`.
    pub fn split_off(&mut self, store: &mut BlockStore, at: usize, index: usize) -> Result<()> {
        let current = self
            .active
            .ok_or_else(|| Error::corruption("split of an inactive cache slot"))?;

        store.write_prefix(current, &self.items[..at])?;
        self.stats.flushes += 1;

        self.items.drain(..at);
        self.active = Some(index);
        self.dirty = true;
        Ok(())
    }

    /// Forget the resident block without writing it back.
    pub fn invalidate(&mut self) {
        self.active = None;
        self.items.clear();
        self.dirty = false;
    }

    /// Index of the resident block
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Items of the resident block
    pub fn items(&self) -> &[i32] {
        &self.items
    }

    /// Whether the resident block has unwritten changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Block capacity in items
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Reset cache statistics to zero.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
