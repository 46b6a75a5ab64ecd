//! Non-volatile memory abstractions
//!
//! Byte-addressable persistent memory (EEPROM, or a flash sector with a
//! RAM mirror). The pattern store is written on top of this.

/// Errors from non-volatile memory operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NvError {
    /// Access beyond the end of the memory
    OutOfBounds,
    /// Underlying erase or program operation failed
    Device,
}

/// Byte-addressable non-volatile memory
///
/// Implementations may buffer writes. Data is only guaranteed to survive
/// a power cycle after [`NvMemory::commit`] returns `Ok`, which lets
/// flash-backed implementations erase and program once per stream
/// instead of once per block.
pub trait NvMemory {
    /// Total size in bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvError>;

    /// Write `data` starting at `offset`
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvError>;

    /// Mark the whole memory erased (all bytes 0xFF)
    fn erase(&mut self) -> Result<(), NvError>;

    /// Persist buffered writes
    fn commit(&mut self) -> Result<(), NvError>;
}

/// Check that `offset..offset + len` lies inside a memory of `capacity` bytes
pub fn check_bounds(capacity: usize, offset: usize, len: usize) -> Result<(), NvError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(NvError::OutOfBounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(check_bounds(64, 0, 64), Ok(()));
        assert_eq!(check_bounds(64, 32, 32), Ok(()));
        assert_eq!(check_bounds(64, 33, 32), Err(NvError::OutOfBounds));
        assert_eq!(check_bounds(64, usize::MAX, 2), Err(NvError::OutOfBounds));
    }
}
