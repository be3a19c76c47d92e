//! Fixed-size block storage.
//!
//! The backing file is a flat array of equally sized blocks. Nothing in the
//! file describes the blocks; how many items a block holds and which range it
//! owns live only in the in-memory directory.
//!
//! ## File Format
//!
//! ```text
//! [Block 0: block_size bytes]
//! [Block 1: block_size bytes]
//! ...
//! [Block N: block_size bytes]
//! ```
//!
//! ## Block Format
//!
//! ```text
//! [Item 1: i32 LE]
//! [Item 2: i32 LE]
//! ...
//! [Item size: i32 LE]   // ascending order
//! [stale bytes]         // never read without a size
//! ```

pub mod codec;
pub mod store;

pub use codec::{decode_items, encode_items};
pub use store::BlockStore;

/// Width of one stored item in bytes
pub const ITEM_WIDTH: usize = std::mem::size_of::<i32>();

/// Default block size (8KB)
pub const DEFAULT_BLOCK_SIZE: usize = 8192;
