//! Audio demodulator task
//!
//! Times every transition on the audio input and feeds the intervals to
//! the demodulator, which queues finished bytes for the main loop.

use defmt::*;
use dotbadge_protocol::{DemodConfig, DemodEvent, Demodulator};
use dotbadge_hal_rp2040::PulseTimer;
use portable_atomic::Ordering;

use crate::channels::{RECEIVER_ENABLED, RECEIVER_ON, RX_RING};

#[embassy_executor::task]
pub async fn demod_task(mut timer: PulseTimer<'static>, config: DemodConfig) {
    info!("Demodulator started, sync threshold {=u16}", config.sync_threshold);

    let mut demod = Demodulator::new(config);

    loop {
        if !RECEIVER_ENABLED.load(Ordering::Acquire) {
            while !RECEIVER_ENABLED.load(Ordering::Acquire) {
                RECEIVER_ON.wait().await;
            }
            demod.reset();
            timer.restart();
        }

        let ticks = timer.next_interval().await;
        if !RECEIVER_ENABLED.load(Ordering::Acquire) {
            continue;
        }

        match demod.on_edge(ticks, &RX_RING) {
            DemodEvent::Byte(byte) => trace!("rx {=u8:#04x}", byte),
            DemodEvent::Dropped(byte) => {
                warn!("Receive ring full, dropped {=u8:#04x} ({=u16} total)", byte, RX_RING.dropped())
            }
            DemodEvent::Sync => trace!("sync, bit threshold {=u16}", demod.bit_threshold()),
            DemodEvent::Bit(_) => {}
        }
    }
}
