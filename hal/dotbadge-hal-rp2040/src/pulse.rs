//! Audio input edge timing
//!
//! The demodulator thresholds are defined in 125 kHz ticks; the embassy
//! clock runs at 1 MHz, so intervals are divided by eight.

use dotbadge_protocol::demod::micros_to_ticks;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

/// Measures the time between transitions on the audio input
pub struct PulseTimer<'d> {
    input: Input<'d>,
    last: Instant,
}

impl<'d> PulseTimer<'d> {
    pub fn new(input: Input<'d>) -> Self {
        Self {
            input,
            last: Instant::now(),
        }
    }

    /// Wait for the next transition and return the interval since the
    /// previous one, in demodulator ticks
    pub async fn next_interval(&mut self) -> u16 {
        self.input.wait_for_any_edge().await;
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        micros_to_ticks(elapsed.as_micros())
    }

    /// Restart timing from now, e.g. after the receiver was off
    pub fn restart(&mut self) {
        self.last = Instant::now();
    }
}
