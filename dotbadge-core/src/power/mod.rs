//! Buttons and power
//!
//! Two buttons: a short press of one cycles patterns, holding both for
//! the shutdown threshold puts the badge to sleep.

pub mod machine;
pub mod sequence;

pub use machine::{ButtonAction, ButtonMask, PowerMachine, PowerState};
pub use sequence::SleepHooks;
