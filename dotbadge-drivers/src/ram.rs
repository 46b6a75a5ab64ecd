//! RAM-backed non-volatile memory
//!
//! Loses its content on reset. Used by host tests and by boards that
//! only keep patterns until the batteries come out.

use dotbadge_hal::nvm::{check_bounds, NvError, NvMemory};

/// `N` bytes of RAM behaving like erased-to-0xFF memory
#[derive(Debug, Clone)]
pub struct RamNv<const N: usize> {
    bytes: [u8; N],
    commits: usize,
}

impl<const N: usize> Default for RamNv<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamNv<N> {
    /// Fully erased memory
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            commits: 0,
        }
    }

    /// Raw contents
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// How often `commit` was called
    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl<const N: usize> NvMemory for RamNv<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvError> {
        check_bounds(N, offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvError> {
        check_bounds(N, offset, data.len())?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn erase(&mut self) -> Result<(), NvError> {
        self.bytes.fill(0xFF);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), NvError> {
        self.commits += 1;
        Ok(())
    }
}
