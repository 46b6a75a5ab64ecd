//! Single-producer single-consumer byte ring
//!
//! The demodulator (edge interrupt) is the only producer and the
//! receiver (main loop) is the only consumer. No lock is taken: the
//! producer only stores `head`, the consumer only stores `tail`, and
//! slot contents are published with release/acquire ordering on the
//! index that owns them.
//!
//! Head and tail count up forever and wrap at 256. Because the capacity
//! divides 256, `head - tail` (wrapping) is always the fill level.

use portable_atomic::{AtomicU16, AtomicU8, Ordering};

/// Fixed-capacity circular byte queue
///
/// `N` must be a power of two no larger than 128. When full, new bytes
/// are rejected and counted in [`RingBuffer::dropped`]; bytes already
/// queued are never overwritten.
pub struct RingBuffer<const N: usize> {
    slots: [AtomicU8; N],
    head: AtomicU8,
    tail: AtomicU8,
    dropped: AtomicU16,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const VALID: () = assert!(
        N.is_power_of_two() && N <= 128,
        "ring capacity must be a power of two <= 128"
    );

    /// Create an empty ring
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicU8::new(0),
            tail: AtomicU8::new(0),
            dropped: AtomicU16::new(0),
        }
    }

    /// Number of bytes waiting to be read
    pub fn available(&self) -> u8 {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail)
    }

    /// Check if the ring holds no bytes
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Store one byte (producer side)
    ///
    /// Returns `false` and leaves the ring untouched if it is full.
    pub fn put(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if usize::from(head.wrapping_sub(tail)) == N {
            let dropped = self.dropped.load(Ordering::Relaxed);
            self.dropped.store(dropped.saturating_add(1), Ordering::Relaxed);
            return false;
        }
        self.slots[usize::from(head) % N].store(byte, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Fetch one byte (consumer side)
    ///
    /// Returns 0 when empty; check [`RingBuffer::available`] first if a
    /// zero byte must be told apart from "nothing there".
    pub fn get(&self) -> u8 {
        self.try_get().unwrap_or(0)
    }

    /// Fetch one byte if there is one (consumer side)
    pub fn try_get(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let byte = self.slots[usize::from(tail) % N].load(Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Drop everything currently queued (consumer side)
    pub fn discard(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }

    /// Number of bytes rejected because the ring was full (saturating)
    pub fn dropped(&self) -> u16 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_ring() {
        let ring = RingBuffer::<32>::new();
        assert_eq!(ring.available(), 0);
        assert!(ring.is_empty());
        assert_eq!(ring.get(), 0);
        assert_eq!(ring.try_get(), None);
    }

    #[test]
    fn test_put_get_in_order() {
        let ring = RingBuffer::<32>::new();
        assert!(ring.put(0x11));
        assert!(ring.put(0x22));
        assert!(ring.put(0x33));
        assert_eq!(ring.available(), 3);
        assert_eq!(ring.get(), 0x11);
        assert_eq!(ring.get(), 0x22);
        assert_eq!(ring.get(), 0x33);
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_full_ring_rejects_without_corruption() {
        let ring = RingBuffer::<32>::new();
        for i in 0..32u8 {
            assert!(ring.put(i));
        }
        assert_eq!(ring.available(), 32);

        assert!(!ring.put(0xEE));
        assert!(!ring.put(0xEF));
        assert_eq!(ring.available(), 32);
        assert_eq!(ring.dropped(), 2);

        for i in 0..32u8 {
            assert_eq!(ring.get(), i);
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_indices_wrap_past_255() {
        let ring = RingBuffer::<64>::new();
        // Walk the counters across the u8 boundary several times
        for round in 0..20u16 {
            for i in 0..50u8 {
                assert!(ring.put(i ^ round as u8));
            }
            assert_eq!(ring.available(), 50);
            for i in 0..50u8 {
                assert_eq!(ring.get(), i ^ round as u8);
            }
        }
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_discard() {
        let ring = RingBuffer::<32>::new();
        ring.put(1);
        ring.put(2);
        ring.discard();
        assert!(ring.is_empty());
        ring.put(3);
        assert_eq!(ring.get(), 3);
    }

    proptest! {
        #[test]
        fn prop_fifo_up_to_capacity(bytes in proptest::collection::vec(any::<u8>(), 0..=64)) {
            let ring = RingBuffer::<64>::new();
            for &b in &bytes {
                prop_assert!(ring.put(b));
            }
            prop_assert_eq!(usize::from(ring.available()), bytes.len());
            for &b in &bytes {
                prop_assert_eq!(ring.get(), b);
            }
            prop_assert_eq!(ring.dropped(), 0);
        }

        #[test]
        fn prop_interleaved_matches_model(ops in proptest::collection::vec(any::<Option<u8>>(), 0..400)) {
            // Some(b) = put, None = get; compare against a bounded model queue
            let ring = RingBuffer::<16>::new();
            let mut model = heapless::Deque::<u8, 16>::new();
            for op in ops {
                match op {
                    Some(b) => {
                        let accepted = ring.put(b);
                        prop_assert_eq!(accepted, model.push_back(b).is_ok());
                    }
                    None => {
                        prop_assert_eq!(ring.try_get(), model.pop_front());
                    }
                }
                prop_assert_eq!(usize::from(ring.available()), model.len());
            }
        }
    }
}
