//! Block descriptors.

/// In-memory metadata for one block.
///
/// `[min, max]` is the inclusive range of values the block owns. `max` is
/// also the block's heap key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Smallest value the block owns
    pub min: i32,
    /// Largest value the block owns
    pub max: i32,
    /// Number of items stored in the block
    pub size: usize,
}

impl BlockDescriptor {
    /// Create a new BlockDescriptor
    pub fn new(min: i32, max: i32, size: usize) -> Self {
        Self { min, max, size }
    }

    /// An empty descriptor owning every `i32`.
    pub fn full_domain() -> Self {
        Self::new(i32::MIN, i32::MAX, 0)
    }

    /// Check whether `item` falls in this block's range
    pub fn contains(&self, item: i32) -> bool {
        self.min <= item && item <= self.max
    }

    /// Check if the block stores no items
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
