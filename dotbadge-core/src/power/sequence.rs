//! Sleep sequence collaborators
//!
//! The order of the sleep sequence lives in [`crate::Badge::sleep`]; the
//! board supplies the individual steps through this trait.

use crate::power::ButtonMask;
use crate::Frame;

/// Board operations used while entering and leaving sleep
#[allow(async_fn_in_trait)]
pub trait SleepHooks {
    /// Power the audio receiver up or down
    fn set_receiver(&mut self, enabled: bool);

    /// Start or stop the matrix refresh
    fn set_display(&mut self, enabled: bool);

    /// Put `frame` on the display right away
    fn show(&mut self, frame: &Frame);

    /// Buttons currently held
    fn buttons(&mut self) -> ButtonMask;

    /// Wait for `ms` milliseconds
    async fn delay_ms(&mut self, ms: u32);

    /// Arm the wake sources, halt until one fires, disarm them
    async fn sleep_until_wake(&mut self);
}
