//! LED matrix on RP2040 GPIO
//!
//! Each embassy `Output` write is a single SIO set/clear, so the generic
//! pin matrix is fast enough here; this module only configures the pins.

use dotbadge_drivers::GpioMatrix;
use dotbadge_hal::matrix::COLUMNS;
use embassy_rp::gpio::{AnyPin, Drive, Level, Output, SlewRate};
use embassy_rp::Peri;

/// The badge matrix on RP2040 outputs
pub type RpMatrix<'d> = GpioMatrix<Output<'d>, Output<'d>>;

fn output(pin: Peri<'_, AnyPin>) -> Output<'_> {
    let mut out = Output::new(pin, Level::Low);
    // Rows and columns source/sink LED current directly
    out.set_drive_strength(Drive::_12mA);
    out.set_slew_rate(SlewRate::Fast);
    out
}

/// Configure the sixteen matrix lines, row 0 / column 0 first
pub fn new_matrix<'d>(
    rows: [Peri<'d, AnyPin>; COLUMNS],
    columns: [Peri<'d, AnyPin>; COLUMNS],
) -> RpMatrix<'d> {
    GpioMatrix::new(rows.map(output), columns.map(output))
}
