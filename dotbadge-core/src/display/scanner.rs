//! Column scanner
//!
//! Called at a fixed rate (4 kHz by default). Each call lights exactly
//! one column: all columns off, row bits out, that column on. At 4 kHz
//! the full 8×8 picture is redrawn 500 times a second.

use dotbadge_hal::matrix::{MatrixPort, COLUMNS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Frame;

/// Logic level that lights an LED on the row lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// A set bit drives the row high
    #[default]
    ActiveHigh,
    /// Row bits are inverted before output
    ActiveLow,
}

impl Polarity {
    /// Row bits as they go out on the port
    pub fn apply(self, bits: u8) -> u8 {
        match self {
            Polarity::ActiveHigh => bits,
            Polarity::ActiveLow => !bits,
        }
    }
}

/// Display refresh engine state
#[derive(Debug, Clone)]
pub struct Scanner {
    polarity: Polarity,
    column: u8,
    ticks: u32,
}

impl Scanner {
    pub const fn new(polarity: Polarity) -> Self {
        Self {
            polarity,
            column: 0,
            ticks: 0,
        }
    }

    /// Light the next column of `frame`
    pub fn scan<P: MatrixPort>(&mut self, frame: &Frame, port: &mut P) {
        let bits = frame[usize::from(self.column)];
        port.blank();
        port.set_rows(self.polarity.apply(bits));
        port.enable_column(self.column);

        self.column = (self.column + 1) % COLUMNS as u8;
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Turn the matrix off; the column position is kept
    pub fn off<P: MatrixPort>(&self, port: &mut P) {
        port.shutdown();
    }

    /// Column lit by the next `scan`
    pub fn column(&self) -> u8 {
        self.column
    }

    /// Number of `scan` calls so far (wrapping)
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
