//! Matrix refresh task
//!
//! Lights one column per tick from the front buffer and counts ticks;
//! the tick count is the animation time base.

use defmt::*;
use dotbadge_core::config::DisplayConfig;
use dotbadge_core::display::Scanner;
use dotbadge_hal_rp2040::RpMatrix;
use embassy_time::{Duration, Ticker};
use portable_atomic::Ordering;

use crate::channels::{self, DISPLAY_ENABLED, DISPLAY_ON, REFRESH_TICKS};

#[embassy_executor::task]
pub async fn refresh_task(mut matrix: RpMatrix<'static>, config: DisplayConfig) {
    info!("Refresh task started, {} us per column", config.refresh_period_us);

    let period = Duration::from_micros(u64::from(config.refresh_period_us));
    let mut scanner = Scanner::new(config.polarity);
    let mut ticker = Ticker::every(period);

    loop {
        if !DISPLAY_ENABLED.load(Ordering::Acquire) {
            scanner.off(&mut matrix);
            debug!("Display off");
            while !DISPLAY_ENABLED.load(Ordering::Acquire) {
                DISPLAY_ON.wait().await;
            }
            debug!("Display on");
            ticker.reset();
        }

        ticker.next().await;
        let frame = channels::front();
        scanner.scan(&frame, &mut matrix);
        REFRESH_TICKS.store(scanner.ticks(), Ordering::Relaxed);
    }
}
