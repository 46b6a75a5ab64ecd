//! Main loop
//!
//! Runs once per refresh period: polls the buttons, drains received
//! bytes into storage and advances the animation by the refresh ticks
//! that passed since the last iteration.

use defmt::*;
use dotbadge_core::power::ButtonAction;
use dotbadge_hal::PatternStorage;
use dotbadge_protocol::RxEvent;
use embassy_time::{Duration, Ticker};

use crate::board::{Board, FirmwareBadge};
use crate::channels::{self, RX_RING};

#[embassy_executor::task]
pub async fn main_task(mut badge: FirmwareBadge, mut board: Board) {
    info!(
        "Main loop started, pattern {=u8} of {=u8}",
        badge.current_pattern(),
        badge.storage().num_patterns()
    );

    let period = Duration::from_micros(u64::from(badge.config().display.refresh_period_us));
    let mut ticker = Ticker::every(period);
    let mut last_ticks = channels::refresh_ticks();

    loop {
        ticker.next().await;

        match badge.poll_buttons(board.pressed()) {
            ButtonAction::None => {}
            ButtonAction::Next | ButtonAction::Previous => {
                debug!("Pattern {=u8}", badge.current_pattern());
            }
            ButtonAction::Sleep => {
                info!("Going to sleep");
                badge.sleep(&mut board, &RX_RING).await;
                info!("Awake, pattern {=u8}", badge.current_pattern());
                last_ticks = channels::refresh_ticks();
                ticker.reset();
                continue;
            }
        }

        badge.drain(&RX_RING, log_rx_event);

        let now = channels::refresh_ticks();
        let elapsed = now.wrapping_sub(last_ticks);
        last_ticks = now;
        if let Some(frame) = badge.animate(elapsed) {
            channels::publish(&frame);
        }
    }
}

fn log_rx_event(event: RxEvent) {
    match event {
        RxEvent::StreamStarted => info!("Receiving patterns"),
        RxEvent::PatternStored { header1, length } => {
            debug!("Stored pattern type {=u8}, {=u16} bytes", header1 >> 4, length)
        }
        RxEvent::StreamFinished(Ok(count)) => info!("Stream finished, {=u8} patterns", count),
        RxEvent::StreamFinished(Err(e)) => warn!("Stream finished but sync failed: {}", e),
        RxEvent::StorageFailed(e) => warn!("Pattern storage failed: {}", e),
    }
}
