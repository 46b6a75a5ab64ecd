//! Double-buffered front buffer
//!
//! Two complete frames and an index. Writers fill the inactive frame and
//! flip; the reader always sees a whole frame, old or new, never a mix.

use crate::{Frame, BLANK_FRAME};

#[derive(Debug, Clone)]
pub struct FrontBuffer {
    frames: [Frame; 2],
    active: usize,
}

impl Default for FrontBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontBuffer {
    /// Both halves blank
    pub const fn new() -> Self {
        Self {
            frames: [BLANK_FRAME; 2],
            active: 0,
        }
    }

    /// The frame being displayed
    pub fn front(&self) -> &Frame {
        &self.frames[self.active]
    }

    /// Row bits of one displayed column
    pub fn column(&self, column: u8) -> u8 {
        self.front().get(usize::from(column)).copied().unwrap_or(0)
    }

    /// The frame being prepared
    pub fn back_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.active ^ 1]
    }

    /// Make the back frame the displayed one
    pub fn flip(&mut self) {
        self.active ^= 1;
    }

    /// Write `frame` into the back half and flip
    pub fn publish(&mut self, frame: &Frame) {
        *self.back_mut() = *frame;
        self.flip();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_blank() {
        let buf = FrontBuffer::new();
        assert_eq!(buf.front(), &BLANK_FRAME);
        assert_eq!(buf.column(7), 0);
    }

    #[test]
    fn test_back_writes_are_invisible_until_flip() {
        let mut buf = FrontBuffer::new();
        buf.back_mut()[0] = 0xFF;
        assert_eq!(buf.column(0), 0);
        buf.flip();
        assert_eq!(buf.column(0), 0xFF);
    }

    #[test]
    fn test_publish_alternates_halves() {
        let mut buf = FrontBuffer::new();
        buf.publish(&[1; 8]);
        assert_eq!(buf.front(), &[1; 8]);
        buf.publish(&[2; 8]);
        assert_eq!(buf.front(), &[2; 8]);
        // The previous frame is now the back half
        assert_eq!(buf.back_mut(), &mut [1; 8]);
    }

    #[test]
    fn test_column_out_of_range() {
        let mut buf = FrontBuffer::new();
        buf.publish(&[0xAA; 8]);
        assert_eq!(buf.column(8), 0);
    }
}
