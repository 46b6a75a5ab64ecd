//! Pulse-width demodulator
//!
//! Called once per signal transition with the time since the previous
//! one. A long pulse is a sync pulse: it marks the start of a byte and
//! recalibrates the bit threshold to a quarter of its width. Every other
//! pulse is one bit, long = 1, short = 0.
//!
//! Bits arrive LSB first, so each new bit is shifted in at the top and
//! the byte is complete after eight of them.

use crate::ring::RingBuffer;

/// Default sync threshold in 125 kHz timer ticks
pub const DEFAULT_SYNC_THRESHOLD: u16 = 42;

/// Demodulator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemodConfig {
    /// Pulses strictly longer than this many ticks are sync pulses
    pub sync_threshold: u16,
}

impl DemodConfig {
    /// Configuration with the default sync threshold
    pub const fn new() -> Self {
        Self {
            sync_threshold: DEFAULT_SYNC_THRESHOLD,
        }
    }
}

impl Default for DemodConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single edge produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DemodEvent {
    /// Sync pulse; bit threshold recalibrated
    Sync,
    /// One bit shifted in, byte not complete yet
    Bit(bool),
    /// Byte completed and queued
    Byte(u8),
    /// Byte completed but the ring was full
    Dropped(u8),
}

/// Symbol and byte assembly state
#[derive(Debug, Clone)]
pub struct Demodulator {
    config: DemodConfig,
    bit_threshold: u16,
    bit: u8,
    byte: u8,
}

impl Default for Demodulator {
    fn default() -> Self {
        Self::new(DemodConfig::default())
    }
}

impl Demodulator {
    /// Create a demodulator that has not seen a sync pulse yet
    pub const fn new(config: DemodConfig) -> Self {
        Self {
            config,
            bit_threshold: 0,
            bit: 0,
            byte: 0,
        }
    }

    /// Forget any partially assembled byte and the learned threshold
    pub fn reset(&mut self) {
        self.bit_threshold = 0;
        self.bit = 0;
        self.byte = 0;
    }

    /// Current bit threshold learned from the last sync pulse
    pub fn bit_threshold(&self) -> u16 {
        self.bit_threshold
    }

    /// Process one signal transition
    ///
    /// `elapsed` is the pulse length in timer ticks since the previous
    /// transition.
    pub fn on_edge<const N: usize>(&mut self, elapsed: u16, ring: &RingBuffer<N>) -> DemodEvent {
        if elapsed > self.config.sync_threshold {
            self.bit_threshold = elapsed >> 2;
            self.bit = 0;
            self.byte = 0;
            return DemodEvent::Sync;
        }

        let one = elapsed >= self.bit_threshold;
        self.byte = (self.byte >> 1) | if one { 0x80 } else { 0x00 };

        self.bit = (self.bit + 1) % 8;
        if self.bit != 0 {
            return DemodEvent::Bit(one);
        }

        if ring.put(self.byte) {
            DemodEvent::Byte(self.byte)
        } else {
            DemodEvent::Dropped(self.byte)
        }
    }
}

/// Convert an edge interval in microseconds into 125 kHz timer ticks
///
/// Saturates instead of wrapping so that a long idle gap always reads
/// as a sync pulse.
pub fn micros_to_ticks(micros: u64) -> u16 {
    u16::try_from(micros >> 3).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYNC: u16 = 80; // bit threshold becomes 20
    const LONG: u16 = 30;
    const SHORT: u16 = 10;

    fn pulse_for(bit: bool) -> u16 {
        if bit {
            LONG
        } else {
            SHORT
        }
    }

    /// Pulses for one byte, LSB first, preceded by a sync pulse
    fn pulses_for(byte: u8) -> [u16; 9] {
        let mut out = [SYNC; 9];
        for i in 0..8 {
            out[i + 1] = pulse_for(byte & (1 << i) != 0);
        }
        out
    }

    #[test]
    fn test_sync_sets_threshold() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        assert_eq!(demod.on_edge(SYNC, &ring), DemodEvent::Sync);
        assert_eq!(demod.bit_threshold(), SYNC >> 2);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_pulse_at_threshold_is_a_one() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        demod.on_edge(SYNC, &ring);
        assert_eq!(demod.on_edge(SYNC >> 2, &ring), DemodEvent::Bit(true));
        assert_eq!(demod.on_edge((SYNC >> 2) - 1, &ring), DemodEvent::Bit(false));
    }

    #[test]
    fn test_threshold_boundary_is_not_sync() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        demod.on_edge(SYNC, &ring);
        // Exactly at the sync threshold is still a data pulse
        assert_eq!(
            demod.on_edge(DEFAULT_SYNC_THRESHOLD, &ring),
            DemodEvent::Bit(true)
        );
        assert_eq!(
            demod.on_edge(DEFAULT_SYNC_THRESHOLD + 1, &ring),
            DemodEvent::Sync
        );
    }

    #[test]
    fn test_alternating_pairs_emit_one_byte() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        let pulses = [SYNC, LONG, LONG, SHORT, SHORT, LONG, LONG, SHORT, SHORT];

        let mut bytes = 0;
        for (i, &p) in pulses.iter().enumerate() {
            match demod.on_edge(p, &ring) {
                DemodEvent::Byte(_) => {
                    bytes += 1;
                    assert_eq!(i, pulses.len() - 1);
                }
                DemodEvent::Dropped(_) => panic!("ring should not be full"),
                _ => {}
            }
        }

        assert_eq!(bytes, 1);
        assert_eq!(ring.available(), 1);
        // First bit received ends up as bit 0, the last one as the MSB
        assert_eq!(ring.get(), 0b0011_0011);
    }

    #[test]
    fn test_byte_values() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        for byte in [0x00, 0xFF, 0xA5, 0x0F, 0x84, 0x01, 0x80] {
            for p in pulses_for(byte) {
                demod.on_edge(p, &ring);
            }
            assert_eq!(ring.get(), byte);
        }
    }

    #[test]
    fn test_sync_mid_byte_restarts_assembly() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        demod.on_edge(SYNC, &ring);
        for _ in 0..5 {
            demod.on_edge(LONG, &ring);
        }
        for p in pulses_for(0x5A) {
            demod.on_edge(p, &ring);
        }
        assert_eq!(ring.available(), 1);
        assert_eq!(ring.get(), 0x5A);
    }

    #[test]
    fn test_sync_clears_partial_byte() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        demod.on_edge(SYNC, &ring);
        for _ in 0..7 {
            demod.on_edge(LONG, &ring);
        }
        assert_eq!(demod.on_edge(SYNC, &ring), DemodEvent::Sync);
        assert_eq!(demod.byte, 0);
        // One bit after the sync lands at the top of an empty accumulator
        demod.on_edge(LONG, &ring);
        assert_eq!(demod.byte, 0x80);
    }

    #[test]
    fn test_bytes_without_resync_keep_counting() {
        let ring = RingBuffer::<32>::new();
        let mut demod = Demodulator::default();
        demod.on_edge(SYNC, &ring);
        for byte in [0x12u8, 0x34] {
            for i in 0..8 {
                demod.on_edge(pulse_for(byte & (1 << i) != 0), &ring);
            }
        }
        assert_eq!(ring.get(), 0x12);
        assert_eq!(ring.get(), 0x34);
    }

    #[test]
    fn test_full_ring_drops_byte() {
        let ring = RingBuffer::<32>::new();
        for _ in 0..32 {
            ring.put(0);
        }
        let mut demod = Demodulator::default();
        let mut last = DemodEvent::Sync;
        for p in pulses_for(0x42) {
            last = demod.on_edge(p, &ring);
        }
        assert_eq!(last, DemodEvent::Dropped(0x42));
        assert_eq!(ring.available(), 32);
        assert_eq!(ring.dropped(), 1);
    }

    #[test]
    fn test_micros_to_ticks() {
        assert_eq!(micros_to_ticks(0), 0);
        assert_eq!(micros_to_ticks(8), 1);
        assert_eq!(micros_to_ticks(336), 42);
        assert_eq!(micros_to_ticks(u64::MAX), u16::MAX);
    }
}
