//! LED matrix over individual GPIO pins
//!
//! Eight row pins carry the pixel bits, eight column pins select the
//! lit column (high = on). Each line is a separate pin write, so there
//! is a short window where rows change with the column already off;
//! boards with port-wide writes should implement `MatrixPort` directly.

use dotbadge_hal::matrix::{MatrixPort, COLUMNS};
use embedded_hal::digital::OutputPin;

/// Matrix on sixteen output pins
pub struct GpioMatrix<R, C> {
    rows: [R; COLUMNS],
    columns: [C; COLUMNS],
}

impl<R: OutputPin, C: OutputPin> GpioMatrix<R, C> {
    /// Take the pins, row 0 / column 0 first; the matrix starts dark
    pub fn new(rows: [R; COLUMNS], columns: [C; COLUMNS]) -> Self {
        let mut matrix = Self { rows, columns };
        matrix.shutdown();
        matrix
    }

    /// Give the pins back
    pub fn release(self) -> ([R; COLUMNS], [C; COLUMNS]) {
        (self.rows, self.columns)
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    // Pin errors cannot be handled mid-scan; the next refresh retries
    let _ = if high { pin.set_high() } else { pin.set_low() };
}

impl<R: OutputPin, C: OutputPin> MatrixPort for GpioMatrix<R, C> {
    fn blank(&mut self) {
        for column in &mut self.columns {
            drive(column, false);
        }
    }

    fn set_rows(&mut self, bits: u8) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            drive(row, bits & (1 << i) != 0);
        }
    }

    fn enable_column(&mut self, column: u8) {
        if let Some(pin) = self.columns.get_mut(usize::from(column)) {
            drive(pin, true);
        }
    }
}
