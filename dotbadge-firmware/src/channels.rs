//! State shared between tasks
//!
//! The refresh and demodulator tasks run on the high-priority interrupt
//! executor; everything here is safe to touch from either executor.

use core::cell::RefCell;

use dotbadge_core::display::FrontBuffer;
use dotbadge_core::Frame;
use dotbadge_protocol::RingBuffer;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Receive ring capacity in bytes
pub const RX_RING_SIZE: usize = 64;

/// Bytes from the demodulator to the main loop
pub static RX_RING: RingBuffer<RX_RING_SIZE> = RingBuffer::new();

/// Frame shown by the refresh task
pub static FRONT: Mutex<CriticalSectionRawMutex, RefCell<FrontBuffer>> =
    Mutex::new(RefCell::new(FrontBuffer::new()));

/// Refresh ticks since boot (wraps)
pub static REFRESH_TICKS: AtomicU32 = AtomicU32::new(0);

/// Matrix scanning on/off
pub static DISPLAY_ENABLED: AtomicBool = AtomicBool::new(true);

/// Audio receiver on/off
pub static RECEIVER_ENABLED: AtomicBool = AtomicBool::new(true);

/// Raised when the display is switched back on
pub static DISPLAY_ON: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Raised when the receiver is switched back on
pub static RECEIVER_ON: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Swap a new frame in for the refresh task
pub fn publish(frame: &Frame) {
    FRONT.lock(|front| front.borrow_mut().publish(frame));
}

/// Copy of the frame currently shown
pub fn front() -> Frame {
    FRONT.lock(|front| *front.borrow().front())
}

pub fn refresh_ticks() -> u32 {
    REFRESH_TICKS.load(Ordering::Relaxed)
}

pub fn set_display_enabled(enabled: bool) {
    DISPLAY_ENABLED.store(enabled, Ordering::Release);
    if enabled {
        DISPLAY_ON.signal(());
    }
}

pub fn set_receiver_enabled(enabled: bool) {
    RECEIVER_ENABLED.store(enabled, Ordering::Release);
    if enabled {
        RECEIVER_ON.signal(());
    }
}
