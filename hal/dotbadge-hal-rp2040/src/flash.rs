//! Pattern memory in flash
//!
//! The last 4 KiB sector of the 2 MiB flash holds the pattern store. A
//! RAM mirror takes all reads and writes; the sector is erased and
//! programmed only on `commit`, once per received stream.

use dotbadge_hal::nvm::{check_bounds, NvError, NvMemory};
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

/// Flash size on the badge board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the pattern sector from the start of flash
pub const PATTERN_SECTOR: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// One flash sector behind a RAM mirror
pub struct FlashNv<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    mirror: [u8; ERASE_SIZE],
    dirty: bool,
}

impl<'d> FlashNv<'d> {
    /// Take the flash and load the pattern sector
    ///
    /// If the sector cannot be read the memory starts out erased.
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        let mut nv = Self {
            flash: Flash::new_blocking(flash),
            mirror: [0xFF; ERASE_SIZE],
            dirty: false,
        };
        if nv.flash.blocking_read(PATTERN_SECTOR, &mut nv.mirror).is_err() {
            nv.mirror.fill(0xFF);
        }
        nv
    }
}

impl NvMemory for FlashNv<'_> {
    fn capacity(&self) -> usize {
        ERASE_SIZE
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvError> {
        check_bounds(ERASE_SIZE, offset, buf.len())?;
        buf.copy_from_slice(&self.mirror[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvError> {
        check_bounds(ERASE_SIZE, offset, data.len())?;
        self.mirror[offset..offset + data.len()].copy_from_slice(data);
        self.dirty = true;
        Ok(())
    }

    fn erase(&mut self) -> Result<(), NvError> {
        self.mirror.fill(0xFF);
        self.dirty = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), NvError> {
        if !self.dirty {
            return Ok(());
        }
        self.flash
            .blocking_erase(PATTERN_SECTOR, PATTERN_SECTOR + ERASE_SIZE as u32)
            .map_err(|_| NvError::Device)?;
        self.flash
            .blocking_write(PATTERN_SECTOR, &self.mirror)
            .map_err(|_| NvError::Device)?;
        self.dirty = false;
        Ok(())
    }
}
