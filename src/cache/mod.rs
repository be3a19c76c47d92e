//! Block cache implementation.
//!
//! Provides the single-slot write-back cache that every access to block
//! contents goes through.

mod slot;

pub use slot::{BlockCache, CacheStats};
