//! Two push buttons
//!
//! Both buttons are active low with pull-ups: a pressed button reads
//! low. The left button selects the previous pattern, the right one the
//! next.

use dotbadge_core::power::ButtonMask;
use embassy_futures::select::{select, Either};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

/// Left and right button inputs
pub struct ButtonPair<L, R> {
    left: L,
    right: R,
}

impl<L: InputPin, R: InputPin> ButtonPair<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    /// Buttons currently held; a pin that fails to read counts as released
    pub fn pressed(&mut self) -> ButtonMask {
        ButtonMask::from_pressed(
            self.left.is_low().unwrap_or(false),
            self.right.is_low().unwrap_or(false),
        )
    }
}

impl<L: InputPin + Wait, R: InputPin + Wait> ButtonPair<L, R> {
    /// Wait until either button is pressed
    ///
    /// Used as the wake source while asleep. Returns the button that
    /// fired; a pin error counts as a wake-up.
    pub async fn wait_for_press(&mut self) -> ButtonMask {
        match select(
            self.left.wait_for_falling_edge(),
            self.right.wait_for_falling_edge(),
        )
        .await
        {
            Either::First(_) => ButtonMask::LEFT,
            Either::Second(_) => ButtonMask::RIGHT,
        }
    }
}
