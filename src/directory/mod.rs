//! Block directory.
//!
//! The directory is a `Vec` of block descriptors read as an implicit binary
//! heap (`parent = (i-1)/2`, children `2i+1` and `2i+2`). It keeps two
//! orders over the same array at once:
//!
//! - **Heap order**: every block's `max` is at most its parent's `max`, so the
//!   root owns the largest values.
//! - **Range partition**: the `[min, max]` ranges are disjoint, non-empty and
//!   together cover every `i32`.
//!
//! Moving a descriptor to another heap position also moves the block's
//! contents to that position's slot in the backing file. All content access
//! goes through the single-slot [`BlockCache`].

mod descriptor;

pub use descriptor::BlockDescriptor;

use crate::block::BlockStore;
use crate::cache::{BlockCache, CacheStats};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn left(i: usize) -> usize {
    2 * i + 1
}

fn right(i: usize) -> usize {
    2 * i + 2
}

/// Pick where to cut a sorted block in two.
///
/// Returns the position `p` closest to the middle with
/// `items[p - 1] < items[p]`, so both halves get disjoint value ranges.
/// Returns `None` when every item is equal.
fn split_point(items: &[i32]) -> Option<usize> {
    let half = items.len() / 2;
    (0..items.len())
        .flat_map(|d| [half.checked_sub(d), Some(half + d)])
        .flatten()
        .find(|&p| p > 0 && p < items.len() && items[p - 1] < items[p])
}

/// Heap-ordered, range-partitioned directory of blocks.
#[derive(Debug)]
pub struct BlockDirectory {
    /// Descriptors in heap order
    descriptors: Vec<BlockDescriptor>,
    /// Single resident block
    cache: BlockCache,
    /// Backing block storage
    store: BlockStore,
}

impl BlockDirectory {
    /// Create a directory with one empty block owning the full domain.
    pub fn new(store: BlockStore) -> Self {
        let cache = BlockCache::new(store.capacity());
        Self { descriptors: vec![BlockDescriptor::full_domain()], cache, store }
    }

    /// Locate the block whose range contains `item`.
    ///
    /// Walks the heap tree from the root in preorder, left child before right.
    /// A subtree whose root has `max < item` is skipped, since heap order
    /// keeps every range below it lower still.
    pub fn find(&self, item: i32) -> Option<usize> {
        let mut pending = vec![0];

        while let Some(index) = pending.pop() {
            let Some(desc) = self.descriptors.get(index) else {
                continue;
            };
            if desc.contains(item) {
                return Some(index);
            }
            if desc.max < item {
                continue;
            }
            pending.push(right(index));
            pending.push(left(index));
        }

        None
    }

    /// Insert `item` into block `index`, splitting the block once it fills.
    ///
    /// A block whose items are all equal cannot be split. It may stay full,
    /// but one more copy of its value is rejected with [`Error::BlockFull`].
    pub fn insert(&mut self, index: usize, item: i32) -> Result<()> {
        let capacity = self.capacity();

        self.activate(index)?;
        let pos = self.cache.insert_sorted(item);
        self.descriptors[index].size += 1;

        if self.descriptors[index].size < capacity {
            return Ok(());
        }

        match self.split(index)? {
            Some(new_index) => self.restore_after_split(index, new_index),
            None if self.descriptors[index].size > capacity => {
                self.cache.remove(pos);
                self.descriptors[index].size -= 1;
                Err(Error::BlockFull { item, capacity })
            }
            None => {
                log::warn!(
                    "Block {} is full of a single value ({}) and cannot split",
                    index,
                    item
                );
                Ok(())
            }
        }
    }

    /// Split block `index` into a lower half that stays in place and an upper
    /// half appended as a new block.
    ///
    /// Returns the new block's index, or `None` if the block holds a single
    /// repeated value. Heap order is not restored here.
    pub fn split(&mut self, index: usize) -> Result<Option<usize>> {
        self.activate(index)?;

        let items = self.cache.items();
        let Some(at) = split_point(items) else {
            return Ok(None);
        };
        let mid = items[at - 1];
        let size = items.len();
        let new_index = self.descriptors.len();

        self.cache.split_off(&mut self.store, at, new_index)?;

        let old = self.descriptors[index];
        // mid < items[at] <= old.max, so mid + 1 cannot overflow
        self.descriptors[index] = BlockDescriptor::new(old.min, mid, at);
        self.descriptors.push(BlockDescriptor::new(mid + 1, old.max, size - at));

        log::debug!(
            "Split block {} [{}, {}] at {}: kept {} items, moved {} to block {}",
            index,
            old.min,
            old.max,
            mid,
            at,
            size - at,
            new_index
        );

        Ok(Some(new_index))
    }

    /// Restore heap order after `index` was split into `new_index`.
    fn restore_after_split(&mut self, index: usize, new_index: usize) -> Result<()> {
        // The split block's key dropped, so it sifts down. The appended block
        // is a leaf; if the first pass swapped it upward, it now sits at its
        // parent's position.
        let settled = self.heapify(index)?;
        let appended = if settled == new_index { parent(new_index) } else { new_index };
        self.sift_up(appended)?;
        Ok(())
    }

    /// Swap the contents of blocks `i` and `j` in the backing file.
    ///
    /// Uses the descriptor sizes as they are before the swap. The caller swaps
    /// the descriptors afterwards.
    pub fn exchange(&mut self, i: usize, j: usize) -> Result<()> {
        if i == j {
            return Ok(());
        }

        self.activate(i)?;
        let staged = self.cache.items().to_vec();

        self.activate(j)?;
        self.cache.flush_to(&mut self.store, i)?;
        self.cache.replace(j, staged);

        Ok(())
    }

    /// Sift block `i` down until neither child has a greater `max`.
    ///
    /// Returns the block's final position.
    pub fn heapify(&mut self, mut i: usize) -> Result<usize> {
        let len = self.descriptors.len();

        loop {
            let l = left(i);
            let r = right(i);

            let mut largest = i;
            if l < len && self.descriptors[l].max > self.descriptors[largest].max {
                largest = l;
            }
            if r < len && self.descriptors[r].max > self.descriptors[largest].max {
                largest = r;
            }

            if largest == i {
                return Ok(i);
            }

            self.exchange(i, largest)?;
            self.descriptors.swap(i, largest);
            i = largest;
        }
    }

    /// Sift block `i` up while its parent has a smaller `max`.
    ///
    /// Returns the block's final position.
    pub fn sift_up(&mut self, mut i: usize) -> Result<usize> {
        while i > 0 {
            let p = parent(i);
            if self.descriptors[i].max <= self.descriptors[p].max {
                break;
            }

            self.exchange(p, i)?;
            self.descriptors.swap(p, i);
            i = p;
        }
        Ok(i)
    }

    /// Remove and return the largest item of the root block.
    pub fn pop_root(&mut self) -> Result<Option<i32>> {
        if self.descriptors[0].is_empty() {
            return Ok(None);
        }

        self.activate(0)?;
        let item = self
            .cache
            .pop_last()
            .ok_or_else(|| Error::corruption("root block resident without items"))?;
        self.descriptors[0].size -= 1;

        Ok(Some(item))
    }

    /// Return the largest item of the root block.
    pub fn peek_root(&mut self) -> Result<Option<i32>> {
        if self.descriptors[0].is_empty() {
            return Ok(None);
        }

        self.activate(0)?;
        Ok(self.cache.last())
    }

    /// Move the last descriptor into the root position, shrinking the
    /// directory by one. Returns the descriptor that was at the root.
    ///
    /// Contents must already have been exchanged by the caller. If the cache
    /// is still bound to the vanished last slot, it is dropped unflushed.
    pub fn move_last_to_root(&mut self) -> Result<BlockDescriptor> {
        if self.descriptors.len() < 2 {
            return Err(Error::corruption("cannot remove the only block"));
        }

        let last = self.descriptors.len() - 1;
        let vacated = self.descriptors.swap_remove(0);
        if self.cache.active() == Some(last) {
            self.cache.invalidate();
        }

        Ok(vacated)
    }

    /// Extend the root's range upward over a vacated range.
    ///
    /// After the old root is removed, the new root owns the range directly
    /// below it. Its key only grows, so heap order holds.
    pub fn absorb_into_root(&mut self, vacated: BlockDescriptor) -> Result<()> {
        let root = &mut self.descriptors[0];
        if root.max.checked_add(1) != Some(vacated.min) {
            return Err(Error::corruption(format!(
                "vacated range [{}, {}] is not adjacent to root range [{}, {}]",
                vacated.min, vacated.max, root.min, root.max
            )));
        }

        root.max = vacated.max;
        Ok(())
    }

    /// Write the resident block back to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.cache.flush(&mut self.store)
    }

    /// Drop the resident block without writing it back.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Sync the backing file to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.store.sync()
    }

    /// Print every block's descriptor and stored items.
    pub fn dump<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.flush()?;

        for (index, desc) in self.descriptors.iter().enumerate() {
            let items = self.store.read(index)?;

            writeln!(out, "block {}: sz={}, min={}, max={}", index, desc.size, desc.min, desc.max)?;
            let line: Vec<String> = items.iter().take(desc.size).map(i32::to_string).collect();
            writeln!(out, "{}", line.join(" "))?;
        }

        Ok(())
    }

    /// Check every directory and block invariant.
    ///
    /// Flushes the cache and reads each block back from disk.
    pub fn verify(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let len = self.descriptors.len();

        for (i, desc) in self.descriptors.iter().enumerate() {
            if desc.min > desc.max {
                return Err(Error::corruption(format!(
                    "block {} has empty range [{}, {}]",
                    i, desc.min, desc.max
                )));
            }
            if desc.size > capacity {
                return Err(Error::corruption(format!(
                    "block {} holds {} items, capacity is {}",
                    i, desc.size, capacity
                )));
            }
            if i > 0 {
                let p = parent(i);
                if self.descriptors[p].max < desc.max {
                    return Err(Error::corruption(format!(
                        "heap order broken: block {} max {} above parent {} max {}",
                        i, desc.max, p, self.descriptors[p].max
                    )));
                }
            }
            if len > 1 && desc.is_empty() {
                return Err(Error::corruption(format!("block {} is empty", i)));
            }
        }

        let mut ranges: Vec<(i32, i32)> = self.descriptors.iter().map(|d| (d.min, d.max)).collect();
        ranges.sort_unstable();
        if ranges[0].0 != i32::MIN || ranges[len - 1].1 != i32::MAX {
            return Err(Error::corruption("block ranges do not reach both ends of the domain"));
        }
        if let Some(w) = ranges.windows(2).find(|w| w[0].1.checked_add(1) != Some(w[1].0)) {
            return Err(Error::corruption(format!(
                "ranges [{}, {}] and [{}, {}] overlap or leave a gap",
                w[0].0, w[0].1, w[1].0, w[1].1
            )));
        }

        if let Some(active) = self.cache.active() {
            if self.descriptors.get(active).map(|d| d.size) != Some(self.cache.items().len()) {
                return Err(Error::corruption(format!("resident block {} out of sync", active)));
            }
        }

        self.flush()?;
        for index in 0..len {
            let desc = self.descriptors[index];
            let items = self.store.read(index)?;
            let items = &items[..desc.size];

            if items.windows(2).any(|w| w[0] > w[1]) {
                return Err(Error::corruption(format!("block {} is not sorted", index)));
            }
            if let Some(item) = items.iter().find(|&&item| !desc.contains(item)) {
                return Err(Error::corruption(format!(
                    "block {} holds {} outside [{}, {}]",
                    index, item, desc.min, desc.max
                )));
            }
        }

        Ok(())
    }

    /// Make block `index` resident.
    fn activate(&mut self, index: usize) -> Result<()> {
        let len = self.descriptors[index].size;
        self.cache.activate(&mut self.store, index, len)
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always false; the directory keeps at least one block.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Number of items one block holds
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// Descriptors in heap order
    pub fn descriptors(&self) -> &[BlockDescriptor] {
        &self.descriptors
    }

    /// Descriptor at heap position `index`
    pub fn descriptor(&self, index: usize) -> Option<BlockDescriptor> {
        self.descriptors.get(index).copied()
    }

    /// Get current cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        self.store.path()
    }
}
