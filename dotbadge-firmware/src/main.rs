//! dotbadge - 8×8 LED badge firmware
//!
//! Main firmware binary for RP2040-based badges. Patterns arrive over
//! an audio cable, are stored in flash and played back as scrolling
//! text or frame animations.
//!
//! Two executors: refresh and demodulation run on an interrupt executor
//! so their timing holds while the thread-mode executor runs the main
//! loop.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::Peri;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dotbadge_core::anim::Termination;
use dotbadge_core::config::{AnimationConfig, BadgeConfig, DisplayConfig, LinkConfig, PowerConfig};
use dotbadge_core::display::Polarity;
use dotbadge_core::Badge;
use dotbadge_drivers::{ButtonPair, Font5x7, PatternStore};
use dotbadge_hal::PatternStorage;
use dotbadge_hal_rp2040::{new_matrix, FlashNv, PulseTimer};

use crate::board::Board;

mod board;
mod channels;
mod tasks;

// Generated by build.rs from badge.toml
include!(concat!(env!("OUT_DIR"), "/badge_config.rs"));

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("dotbadge firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = BADGE_CONFIG;
    info!("Configuration: {}", config);

    let rows: [Peri<'static, AnyPin>; 8] = [
        p.PIN_0.into(),
        p.PIN_1.into(),
        p.PIN_2.into(),
        p.PIN_3.into(),
        p.PIN_4.into(),
        p.PIN_5.into(),
        p.PIN_6.into(),
        p.PIN_7.into(),
    ];
    let columns: [Peri<'static, AnyPin>; 8] = [
        p.PIN_8.into(),
        p.PIN_9.into(),
        p.PIN_10.into(),
        p.PIN_11.into(),
        p.PIN_12.into(),
        p.PIN_13.into(),
        p.PIN_14.into(),
        p.PIN_15.into(),
    ];
    let matrix = new_matrix(rows, columns);

    let buttons = ButtonPair::new(Input::new(p.PIN_16, Pull::Up), Input::new(p.PIN_17, Pull::Up));
    let audio = PulseTimer::new(Input::new(p.PIN_18, Pull::None));
    let receiver_bias = Output::new(p.PIN_19, Level::High);
    let board = Board::new(buttons, receiver_bias);

    let store = PatternStore::new(FlashNv::new(p.FLASH));
    info!("Pattern store: {=u8} patterns, {=usize} bytes free", store.num_patterns(), store.free());

    let badge = Badge::new(store, Font5x7, config);
    channels::publish(&badge.engine().frame());

    // Refresh and demodulator preempt the main loop
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner
        .spawn(tasks::refresh_task(matrix, config.display))
        .unwrap();
    spawner
        .spawn(tasks::demod_task(audio, config.link.demod()))
        .unwrap();

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(tasks::main_task(badge, board)).unwrap();
        info!("All tasks spawned, firmware running");
    })
}
