//! Pattern store over non-volatile memory
//!
//! Memory layout:
//!
//! ```text
//! 0      1                 32
//! ┌──────┬─────────────────┬──────────────────────┬──────────────────────┬─
//! │count │ reserved        │ record 0             │ record 1             │ ...
//! └──────┴─────────────────┴──────────────────────┴──────────────────────┴─
//!
//! record: H1 H2 M1 M2 │ block 0 (32) │ block 1 (32) │ ...
//! ```
//!
//! A record holds `max(1, ceil(len / 32))` blocks, so the position of
//! record `n` follows from the headers before it. An erased count byte
//! (0xFF) means no patterns.
//!
//! Writes go to the memory as they arrive, but the count byte is only
//! written, and the memory only committed, on `sync`. A stream that
//! never finishes leaves the previously committed patterns in place on
//! memories that buffer until commit.

use dotbadge_hal::{NvMemory, PatternStorage, StorageError, BLOCK_SIZE, HEADER_SIZE};
use dotbadge_protocol::frame::payload_length;

/// Offset of the first record
pub const DATA_START: usize = 32;

/// Offset of the pattern count
const COUNT_OFFSET: usize = 0;

/// Count byte of erased memory
const ERASED: u8 = 0xFF;

/// Largest number of patterns, one less than the erased marker
pub const MAX_PATTERNS: u8 = ERASED - 1;

/// Bytes a record with the given payload length occupies
pub fn record_size(length: u16) -> usize {
    let blocks = usize::from(length).div_ceil(BLOCK_SIZE).max(1);
    HEADER_SIZE + blocks * BLOCK_SIZE
}

fn header_length(header: &[u8; HEADER_SIZE]) -> u16 {
    payload_length(header[0], header[1])
}

/// Record being written
#[derive(Debug, Clone, Copy)]
struct OpenRecord {
    /// Where the next block goes
    next: usize,
    /// First byte after the record
    end: usize,
}

/// [`PatternStorage`] implementation over an [`NvMemory`]
pub struct PatternStore<M> {
    memory: M,
    count: u8,
    /// First free byte
    write_pos: usize,
    open: Option<OpenRecord>,
}

impl<M: NvMemory> PatternStore<M> {
    /// Open the store, reading the pattern count
    ///
    /// Records that run past the end of the memory are not counted.
    pub fn new(mut memory: M) -> Self {
        let mut count = [ERASED];
        let stored = match memory.read(COUNT_OFFSET, &mut count) {
            Ok(()) if count[0] != ERASED => count[0],
            _ => 0,
        };

        let mut store = Self {
            memory,
            count: 0,
            write_pos: DATA_START,
            open: None,
        };
        for _ in 0..stored {
            match store.read_header(store.write_pos) {
                Ok(header) => {
                    let end = store.write_pos + record_size(header_length(&header));
                    if end > store.memory.capacity() {
                        break;
                    }
                    store.write_pos = end;
                    store.count += 1;
                }
                Err(_) => break,
            }
        }
        store
    }

    /// The underlying memory
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Give the memory back
    pub fn release(self) -> M {
        self.memory
    }

    /// Bytes still free for records
    pub fn free(&self) -> usize {
        self.memory.capacity().saturating_sub(self.write_pos)
    }

    fn read_header(&mut self, offset: usize) -> Result<[u8; HEADER_SIZE], StorageError> {
        let mut header = [0u8; HEADER_SIZE];
        self.memory.read(offset, &mut header)?;
        Ok(header)
    }

    /// Offset of record `index`
    fn locate(&mut self, index: u8) -> Result<usize, StorageError> {
        let mut pos = DATA_START;
        for _ in 0..index {
            let header = self.read_header(pos)?;
            pos += record_size(header_length(&header));
        }
        Ok(pos)
    }
}

impl<M: NvMemory> PatternStorage for PatternStore<M> {
    fn reset(&mut self) -> Result<(), StorageError> {
        self.count = 0;
        self.write_pos = DATA_START;
        self.open = None;
        self.memory.erase()?;
        Ok(())
    }

    fn save(
        &mut self,
        header: &[u8; HEADER_SIZE],
        block: &[u8; BLOCK_SIZE],
    ) -> Result<(), StorageError> {
        self.open = None;
        if self.count >= MAX_PATTERNS {
            return Err(StorageError::Full);
        }
        let start = self.write_pos;
        let end = start + record_size(header_length(header));
        if end > self.memory.capacity() {
            return Err(StorageError::Full);
        }

        self.memory.write(start, header)?;
        self.memory.write(start + HEADER_SIZE, block)?;

        self.write_pos = end;
        self.count += 1;
        self.open = Some(OpenRecord {
            next: start + HEADER_SIZE + BLOCK_SIZE,
            end,
        });
        Ok(())
    }

    fn append(&mut self, block: &[u8; BLOCK_SIZE]) -> Result<(), StorageError> {
        let open = self.open.as_mut().ok_or(StorageError::NoOpenRecord)?;
        if open.next + BLOCK_SIZE > open.end {
            return Err(StorageError::NoOpenRecord);
        }
        self.memory.write(open.next, block)?;
        open.next += BLOCK_SIZE;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        self.open = None;
        self.memory.write(COUNT_OFFSET, &[self.count])?;
        self.memory.commit()?;
        Ok(())
    }

    fn load(&mut self, index: u8, buf: &mut [u8]) -> Result<usize, StorageError> {
        if index >= self.count {
            return Err(StorageError::NotFound);
        }
        let pos = self.locate(index)?;
        let header = self.read_header(pos)?;
        let total = HEADER_SIZE + usize::from(header_length(&header));
        if pos + record_size(header_length(&header)) > self.memory.capacity() {
            return Err(StorageError::Corrupted);
        }

        let len = total.min(buf.len());
        self.memory.read(pos, &mut buf[..len])?;
        Ok(len)
    }

    fn has_data(&self) -> bool {
        self.count > 0
    }

    fn num_patterns(&self) -> u8 {
        self.count
    }
}
