//! Byte-addressed block storage over a single file.

use super::codec::{decode_items, encode_items};
use super::ITEM_WIDTH;
use crate::config::Options;
use crate::error::{Error, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// BlockStore maps block indexes to fixed windows of the backing file.
///
/// Block `i` occupies bytes `[i * block_size, (i + 1) * block_size)`. The
/// store has no notion of ranges or heap order; it only moves items in and
/// out of those windows.
#[derive(Debug)]
pub struct BlockStore {
    /// Path to the backing file
    path: PathBuf,
    /// Backing file handle
    file: File,
    /// Block size in bytes
    block_size: usize,
}

impl BlockStore {
    /// Open the backing file described by `options`.
    ///
    /// The file is extended to hold at least one block.
    pub fn open<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(options.create_if_missing)
            .truncate(options.truncate)
            .open(&path)
            .map_err(|source| Error::Open { path: path.clone(), source })?;

        let len = file.metadata()?.len();
        if len < options.block_size as u64 {
            file.set_len(options.block_size as u64)?;
        }

        Ok(Self { path, file, block_size: options.block_size })
    }

    /// Read a full block and decode every item slot in it.
    ///
    /// Bytes past the end of the file read as zero. Only the first `size`
    /// items are meaningful; the caller knows `size`.
    pub fn read(&mut self, index: usize) -> Result<Vec<i32>> {
        self.file.seek(SeekFrom::Start(self.offset(index)))?;

        let mut buffer = Vec::with_capacity(self.block_size);
        (&mut self.file).take(self.block_size as u64).read_to_end(&mut buffer)?;
        buffer.resize(self.block_size, 0);

        Ok(decode_items(&buffer))
    }

    /// Write `items` at the start of block `index`.
    ///
    /// The rest of the block is left as it was.
    pub fn write_prefix(&mut self, index: usize, items: &[i32]) -> Result<()> {
        if items.len() > self.capacity() {
            return Err(Error::invalid_argument(format!(
                "block {} holds at most {} items, got {}",
                index,
                self.capacity(),
                items.len()
            )));
        }
        if items.is_empty() {
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(self.offset(index)))?;
        self.file.write_all(&encode_items(items))?;
        Ok(())
    }

    /// Sync the backing file to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// File offset of block `index`
    pub fn offset(&self, index: usize) -> u64 {
        index as u64 * self.block_size as u64
    }

    /// Block size in bytes
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of items one block holds
    pub fn capacity(&self) -> usize {
        self.block_size / ITEM_WIDTH
    }

    /// Get the path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
