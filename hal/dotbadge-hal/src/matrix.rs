//! LED matrix drive abstractions
//!
//! The matrix is scanned one column at a time. Each column has a driver
//! line; the eight row lines carry that column's pixel bits.

/// Number of columns (and rows) on the display
pub const COLUMNS: usize = 8;

/// Row and column drive lines of the dot matrix
///
/// Implementations should make each call a single port-wide write where
/// the hardware allows it. The refresh engine issues `blank`,
/// `set_rows` and `enable_column` back to back; anything slower between
/// them shows up as ghosting.
pub trait MatrixPort {
    /// Switch every column driver off
    fn blank(&mut self);

    /// Drive the row lines with the given bits (bit 0 = top row)
    fn set_rows(&mut self, bits: u8);

    /// Switch on exactly one column driver (0-7)
    fn enable_column(&mut self, column: u8);

    /// Drive every line low, leaving the matrix dark and unpowered
    fn shutdown(&mut self) {
        self.blank();
        self.set_rows(0);
    }
}
