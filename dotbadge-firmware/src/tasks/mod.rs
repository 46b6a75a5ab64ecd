//! Embassy async tasks
//!
//! Refresh and demodulation run on the high-priority executor so that
//! column timing and edge timestamps are not delayed by the main loop.

pub mod demod;
pub mod main_loop;
pub mod refresh;

pub use demod::demod_task;
pub use main_loop::main_task;
pub use refresh::refresh_task;
