//! Pattern storage abstractions
//!
//! The framing protocol hands received patterns to a [`PatternStorage`]
//! in fixed-size blocks; the animation side loads them back by index.

use crate::nvm::NvError;

/// Size of one payload block handed to the store
pub const BLOCK_SIZE: usize = 32;

/// Size of a record header (HEADER1 HEADER2 META1 META2)
pub const HEADER_SIZE: usize = 4;

/// Size of the buffer a record is loaded into: header plus 256 payload bytes
pub const RECORD_BUF_SIZE: usize = HEADER_SIZE + 256;

/// Errors from pattern storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// No pattern with the requested index
    NotFound,
    /// Record does not fit in the remaining space
    Full,
    /// `append` without a record opened by `save`
    NoOpenRecord,
    /// Stored data is inconsistent
    Corrupted,
    /// Underlying memory failed
    Memory(NvError),
}

impl From<NvError> for StorageError {
    fn from(e: NvError) -> Self {
        StorageError::Memory(e)
    }
}

/// Pattern record store
///
/// A stream of patterns is written as `reset`, then per pattern one
/// `save` followed by zero or more `append`s, then `sync`.
///
/// Records are read back with [`PatternStorage::load`] in the format:
/// - byte 0: pattern type in the high nibble, length bits 8-11 in the low nibble
/// - byte 1: length bits 0-7
/// - bytes 2-3: timing/direction metadata
/// - remaining bytes: payload
pub trait PatternStorage {
    /// Erase all stored patterns
    fn reset(&mut self) -> Result<(), StorageError>;

    /// Begin a new record with its header and first payload block
    fn save(
        &mut self,
        header: &[u8; HEADER_SIZE],
        block: &[u8; BLOCK_SIZE],
    ) -> Result<(), StorageError>;

    /// Continue the current record with another payload block
    fn append(&mut self, block: &[u8; BLOCK_SIZE]) -> Result<(), StorageError>;

    /// Finalize the stream
    fn sync(&mut self) -> Result<(), StorageError>;

    /// Load record `index` into `buf`
    ///
    /// Returns the number of bytes written. Payload beyond `buf` is cut off.
    fn load(&mut self, index: u8, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Check if at least one pattern is stored
    fn has_data(&self) -> bool;

    /// Number of stored patterns
    fn num_patterns(&self) -> u8;
}
