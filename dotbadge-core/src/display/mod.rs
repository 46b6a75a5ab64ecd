//! Display refresh
//!
//! The matrix is multiplexed one column at a time from a [`FrontBuffer`].
//! The animation side writes whole frames into the buffer's back half
//! and flips; the refresh side only ever reads the front half.

pub mod front;
pub mod scanner;

pub use front::FrontBuffer;
pub use scanner::{Polarity, Scanner};
