//! Badge board wiring
//!
//! | Function        | GPIO        |
//! |-----------------|-------------|
//! | Matrix rows 0-7 | GPIO0-7     |
//! | Columns 0-7     | GPIO8-15    |
//! | Left button     | GPIO16      |
//! | Right button    | GPIO17      |
//! | Audio input     | GPIO18      |
//! | Receiver bias   | GPIO19      |
//!
//! Buttons are active low with internal pull-ups. The receiver bias pin
//! powers the audio input stage and is driven low while asleep.

use defmt::*;
use dotbadge_core::power::{ButtonMask, SleepHooks};
use dotbadge_core::{Badge, Frame};
use dotbadge_drivers::{ButtonPair, Font5x7, PatternStore};
use dotbadge_hal_rp2040::FlashNv;
use embassy_rp::gpio::{Input, Level, Output};
use embassy_time::Timer;

use crate::channels;

/// The badge as built for this board
pub type FirmwareBadge = Badge<PatternStore<FlashNv<'static>>, Font5x7>;

/// Board side of the sleep sequence, and the button inputs
pub struct Board {
    buttons: ButtonPair<Input<'static>, Input<'static>>,
    receiver_bias: Output<'static>,
}

impl Board {
    pub fn new(
        buttons: ButtonPair<Input<'static>, Input<'static>>,
        receiver_bias: Output<'static>,
    ) -> Self {
        Self {
            buttons,
            receiver_bias,
        }
    }

    /// Buttons currently held
    pub fn pressed(&mut self) -> ButtonMask {
        self.buttons.pressed()
    }
}

impl SleepHooks for Board {
    fn set_receiver(&mut self, enabled: bool) {
        self.receiver_bias.set_level(if enabled { Level::High } else { Level::Low });
        channels::set_receiver_enabled(enabled);
    }

    fn set_display(&mut self, enabled: bool) {
        channels::set_display_enabled(enabled);
    }

    fn show(&mut self, frame: &Frame) {
        channels::publish(frame);
    }

    fn buttons(&mut self) -> ButtonMask {
        self.buttons.pressed()
    }

    async fn delay_ms(&mut self, ms: u32) {
        Timer::after_millis(u64::from(ms)).await;
    }

    async fn sleep_until_wake(&mut self) {
        // Both executors idle in WFI until a button edge
        let button = self.buttons.wait_for_press().await;
        debug!("Woken by button {=u8}", button.bits());
    }
}
