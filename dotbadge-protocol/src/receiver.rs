//! Framing state machine
//!
//! Consumes the demodulated byte stream one byte at a time and writes
//! pattern records to a [`PatternStorage`] in 32-byte blocks.
//!
//! Malformed or out-of-order markers are not errors: the machine falls
//! back to [`RxExpect::NextBlock`] and looks at the same byte again, so
//! it resynchronises on the next marker it sees.

use dotbadge_hal::{PatternStorage, StorageError, BLOCK_SIZE, HEADER_SIZE};

use crate::frame::{payload_length, RxExpect, BYTE_END, BYTE_PATTERN, BYTE_START};

/// Something the caller may want to know about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// START START received, storage erased
    StreamStarted,
    /// A complete pattern record was handed to storage
    PatternStored {
        /// Raw HEADER1 byte of the record
        header1: u8,
        /// Payload length in bytes
        length: u16,
    },
    /// END received; carries the stored pattern count or the sync error
    StreamFinished(Result<u8, StorageError>),
    /// A storage call failed; reception continues
    StorageFailed(StorageError),
}

/// Pattern stream receiver
#[derive(Debug, Clone)]
pub struct Receiver {
    state: RxExpect,
    header: [u8; HEADER_SIZE],
    header_pos: usize,
    block: [u8; BLOCK_SIZE],
    block_pos: usize,
    remaining: u16,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver {
    /// Create a receiver waiting for a stream start
    pub const fn new() -> Self {
        Self {
            state: RxExpect::Start1,
            header: [0; HEADER_SIZE],
            header_pos: 0,
            block: [0; BLOCK_SIZE],
            block_pos: 0,
            remaining: 0,
        }
    }

    /// Drop any partially received pattern and wait for a new stream
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current receive cursor
    pub fn state(&self) -> RxExpect {
        self.state
    }

    /// Payload bytes still expected for the current pattern
    pub fn remaining(&self) -> u16 {
        self.remaining
    }

    /// Feed a single byte
    pub fn feed<S: PatternStorage>(&mut self, byte: u8, storage: &mut S) -> Option<RxEvent> {
        self.record(byte);

        match self.state {
            RxExpect::Start1 => {
                if byte == BYTE_START {
                    self.state = RxExpect::Start2;
                    None
                } else {
                    self.next_block(byte, storage)
                }
            }
            RxExpect::Start2 => {
                if byte == BYTE_START {
                    self.state = RxExpect::Pattern1;
                    match storage.reset() {
                        Ok(()) => Some(RxEvent::StreamStarted),
                        Err(e) => Some(RxEvent::StorageFailed(e)),
                    }
                } else {
                    self.next_block(byte, storage)
                }
            }
            RxExpect::NextBlock => self.next_block(byte, storage),
            RxExpect::Pattern1 => {
                if byte == BYTE_PATTERN {
                    self.state = RxExpect::Pattern2;
                    None
                } else {
                    self.next_block(byte, storage)
                }
            }
            RxExpect::Pattern2 => {
                if byte == BYTE_PATTERN {
                    self.begin_record();
                    self.state = RxExpect::Header1;
                    None
                } else {
                    self.next_block(byte, storage)
                }
            }
            RxExpect::Header1 => {
                self.state = RxExpect::Header2;
                None
            }
            RxExpect::Header2 => {
                self.remaining = payload_length(self.header[0], byte);
                self.state = RxExpect::Meta1;
                None
            }
            RxExpect::Meta1 => {
                self.state = RxExpect::Meta2;
                None
            }
            RxExpect::Meta2 => {
                if self.remaining == 0 {
                    // Nothing will follow; store the empty record right away
                    self.state = RxExpect::NextBlock;
                    return Some(self.flush(storage, true));
                }
                self.state = RxExpect::DataFirstBlock;
                None
            }
            RxExpect::DataFirstBlock => {
                if self.remaining == 0 {
                    self.state = RxExpect::NextBlock;
                    Some(self.flush(storage, true))
                } else if self.block_pos == BLOCK_SIZE {
                    self.state = RxExpect::Data;
                    self.flush(storage, true).into_failure()
                } else {
                    None
                }
            }
            RxExpect::Data => {
                if self.remaining == 0 {
                    self.state = RxExpect::NextBlock;
                    Some(self.flush(storage, false))
                } else if self.block_pos == BLOCK_SIZE {
                    self.flush(storage, false).into_failure()
                } else {
                    None
                }
            }
        }
    }

    /// Store a pattern byte according to the current state
    fn record(&mut self, byte: u8) {
        if self.state.is_payload_byte() {
            if let Some(slot) = self.block.get_mut(self.block_pos) {
                *slot = byte;
                self.block_pos += 1;
            }
            self.remaining = self.remaining.saturating_sub(1);
        } else if self.state.is_record_byte() {
            if let Some(slot) = self.header.get_mut(self.header_pos) {
                *slot = byte;
                self.header_pos += 1;
            }
        }
    }

    /// Between patterns: look for START, PATTERN or END, in that order
    fn next_block<S: PatternStorage>(&mut self, byte: u8, storage: &mut S) -> Option<RxEvent> {
        self.state = RxExpect::NextBlock;
        if byte == BYTE_START {
            self.state = RxExpect::Start2;
            None
        } else if byte == BYTE_PATTERN {
            self.state = RxExpect::Pattern2;
            None
        } else if byte == BYTE_END {
            self.state = RxExpect::Start1;
            let result = storage.sync().map(|()| storage.num_patterns());
            Some(RxEvent::StreamFinished(result))
        } else {
            None
        }
    }

    fn begin_record(&mut self) {
        self.header = [0; HEADER_SIZE];
        self.header_pos = 0;
        self.block = [0; BLOCK_SIZE];
        self.block_pos = 0;
        self.remaining = 0;
    }

    /// Hand the current block to storage and start a fresh, zeroed one
    ///
    /// Returns `PatternStored` if this was the last block of the record.
    fn flush<S: PatternStorage>(&mut self, storage: &mut S, first: bool) -> RxEvent {
        let result = if first {
            storage.save(&self.header, &self.block)
        } else {
            storage.append(&self.block)
        };
        self.block = [0; BLOCK_SIZE];
        self.block_pos = 0;

        match result {
            Err(e) => RxEvent::StorageFailed(e),
            Ok(()) => RxEvent::PatternStored {
                header1: self.header[0],
                length: payload_length(self.header[0], self.header[1]),
            },
        }
    }
}

trait IntoFailure {
    fn into_failure(self) -> Option<RxEvent>;
}

impl IntoFailure for RxEvent {
    /// Keep only failures; an intermediate block is not worth reporting
    fn into_failure(self) -> Option<RxEvent> {
        match self {
            RxEvent::StorageFailed(_) => Some(self),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameHeader, PatternKind, StreamEncoder};
    use heapless::Vec;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Reset,
        Save([u8; HEADER_SIZE], [u8; BLOCK_SIZE]),
        Append([u8; BLOCK_SIZE]),
        Sync,
    }

    #[derive(Default)]
    struct RecordingStorage {
        calls: Vec<Call, 256>,
        patterns: u8,
        fail_saves: bool,
    }

    impl PatternStorage for RecordingStorage {
        fn reset(&mut self) -> Result<(), StorageError> {
            self.patterns = 0;
            let _ = self.calls.push(Call::Reset);
            Ok(())
        }

        fn save(
            &mut self,
            header: &[u8; HEADER_SIZE],
            block: &[u8; BLOCK_SIZE],
        ) -> Result<(), StorageError> {
            if self.fail_saves {
                return Err(StorageError::Full);
            }
            self.patterns += 1;
            let _ = self.calls.push(Call::Save(*header, *block));
            Ok(())
        }

        fn append(&mut self, block: &[u8; BLOCK_SIZE]) -> Result<(), StorageError> {
            let _ = self.calls.push(Call::Append(*block));
            Ok(())
        }

        fn sync(&mut self) -> Result<(), StorageError> {
            let _ = self.calls.push(Call::Sync);
            Ok(())
        }

        fn load(&mut self, _index: u8, _buf: &mut [u8]) -> Result<usize, StorageError> {
            Err(StorageError::NotFound)
        }

        fn has_data(&self) -> bool {
            self.patterns > 0
        }

        fn num_patterns(&self) -> u8 {
            self.patterns
        }
    }

    fn feed_all(rx: &mut Receiver, storage: &mut RecordingStorage, bytes: &[u8]) -> Vec<RxEvent, 32> {
        let mut events = Vec::new();
        for &b in bytes {
            if let Some(e) = rx.feed(b, storage) {
                let _ = events.push(e);
            }
        }
        events
    }

    fn padded(data: &[u8]) -> [u8; BLOCK_SIZE] {
        let mut block = [0u8; BLOCK_SIZE];
        block[..data.len()].copy_from_slice(data);
        block
    }

    #[test]
    fn test_short_pattern_saves_one_block() {
        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        let stream = [
            BYTE_START, BYTE_START, BYTE_PATTERN, BYTE_PATTERN, 0x00, 0x04, 0x00, 0x00, b'A', b'B',
            b'C', b'D',
        ];

        let events = feed_all(&mut rx, &mut storage, &stream);

        assert_eq!(
            storage.calls.as_slice(),
            &[
                Call::Reset,
                Call::Save([0x00, 0x04, 0x00, 0x00], padded(b"ABCD")),
            ]
        );
        assert_eq!(
            events.as_slice(),
            &[
                RxEvent::StreamStarted,
                RxEvent::PatternStored {
                    header1: 0x00,
                    length: 4
                },
            ]
        );
        assert_eq!(rx.state(), RxExpect::NextBlock);

        let events = feed_all(&mut rx, &mut storage, &[BYTE_END]);
        assert_eq!(events.as_slice(), &[RxEvent::StreamFinished(Ok(1))]);
        assert_eq!(storage.calls.last(), Some(&Call::Sync));
        assert_eq!(rx.state(), RxExpect::Start1);
    }

    #[test]
    fn test_long_pattern_splits_into_blocks() {
        let mut payload = [0u8; 70];
        for (i, b) in payload.iter_mut().enumerate() {
            *b = i as u8 + 1;
        }
        let header = FrameHeader::new(PatternKind::Frames, 70, 0x01, 0x02).unwrap();
        let mut enc = StreamEncoder::<128>::new();
        enc.pattern(&header, &payload).unwrap();
        let stream = enc.finish().unwrap();

        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        feed_all(&mut rx, &mut storage, &stream);

        assert_eq!(
            storage.calls.as_slice(),
            &[
                Call::Reset,
                Call::Save(*header.as_bytes(), padded(&payload[..32])),
                Call::Append(padded(&payload[32..64])),
                Call::Append(padded(&payload[64..])),
                Call::Sync,
            ]
        );
    }

    #[test]
    fn test_exact_block_multiple() {
        let payload = [0x55u8; 64];
        let header = FrameHeader::new(PatternKind::Frames, 64, 0, 0).unwrap();
        let mut enc = StreamEncoder::<128>::new();
        enc.pattern(&header, &payload).unwrap();
        let stream = enc.finish().unwrap();

        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        feed_all(&mut rx, &mut storage, &stream);

        assert_eq!(storage.calls.len(), 4);
        assert!(matches!(storage.calls[1], Call::Save(_, _)));
        assert_eq!(storage.calls[2], Call::Append([0x55; BLOCK_SIZE]));
        assert_eq!(storage.calls[3], Call::Sync);
    }

    #[test]
    fn test_zero_length_pattern() {
        let header = FrameHeader::new(PatternKind::Text, 0, 0x20, 0).unwrap();
        let mut enc = StreamEncoder::<32>::new();
        enc.pattern(&header, &[]).unwrap();
        let stream = enc.finish().unwrap();

        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        let events = feed_all(&mut rx, &mut storage, &stream);

        assert_eq!(
            storage.calls.as_slice(),
            &[
                Call::Reset,
                Call::Save(*header.as_bytes(), [0; BLOCK_SIZE]),
                Call::Sync
            ]
        );
        assert_eq!(events.last(), Some(&RxEvent::StreamFinished(Ok(1))));
    }

    #[test]
    fn test_multiple_patterns() {
        let h1 = FrameHeader::new(PatternKind::Text, 3, 0x20, 0).unwrap();
        let h2 = FrameHeader::new(PatternKind::Frames, 8, 0x01, 0x01).unwrap();
        let mut enc = StreamEncoder::<64>::new();
        enc.pattern(&h1, b"abc").unwrap();
        enc.pattern(&h2, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let stream = enc.finish().unwrap();

        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        let events = feed_all(&mut rx, &mut storage, &stream);

        assert_eq!(
            storage.calls.as_slice(),
            &[
                Call::Reset,
                Call::Save(*h1.as_bytes(), padded(b"abc")),
                Call::Save(*h2.as_bytes(), padded(&[1, 2, 3, 4, 5, 6, 7, 8])),
                Call::Sync,
            ]
        );
        assert_eq!(events.last(), Some(&RxEvent::StreamFinished(Ok(2))));
    }

    #[test]
    fn test_garbage_before_start_is_ignored() {
        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        feed_all(&mut rx, &mut storage, &[0x00, 0xFF, 0x12, 0x34]);
        assert!(storage.calls.is_empty());

        feed_all(&mut rx, &mut storage, &[BYTE_START, BYTE_START]);
        assert_eq!(storage.calls.as_slice(), &[Call::Reset]);
        assert_eq!(rx.state(), RxExpect::Pattern1);
    }

    #[test]
    fn test_failed_start_retests_byte() {
        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();

        // START then END: the END is recognised although START2 was expected
        let events = feed_all(&mut rx, &mut storage, &[BYTE_START, BYTE_END]);
        assert_eq!(events.as_slice(), &[RxEvent::StreamFinished(Ok(0))]);
        assert_eq!(rx.state(), RxExpect::Start1);

        // START then PATTERN: goes straight to the second pattern marker
        feed_all(&mut rx, &mut storage, &[BYTE_START, BYTE_PATTERN]);
        assert_eq!(rx.state(), RxExpect::Pattern2);
    }

    #[test]
    fn test_broken_pattern_marker_resyncs() {
        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        feed_all(&mut rx, &mut storage, &[BYTE_START, BYTE_START, BYTE_PATTERN, 0x42]);
        assert_eq!(rx.state(), RxExpect::NextBlock);

        // A clean pattern afterwards is still received
        let rest = [BYTE_PATTERN, BYTE_PATTERN, 0x10, 0x01, 0x00, 0x00, b'x', BYTE_END];
        let events = feed_all(&mut rx, &mut storage, &rest);
        assert_eq!(
            storage.calls.as_slice(),
            &[
                Call::Reset,
                Call::Save([0x10, 0x01, 0x00, 0x00], padded(b"x")),
                Call::Sync
            ]
        );
        assert_eq!(events.last(), Some(&RxEvent::StreamFinished(Ok(1))));
    }

    #[test]
    fn test_marker_bytes_inside_payload_are_data() {
        let payload = [BYTE_END, BYTE_START, BYTE_PATTERN];
        let header = FrameHeader::new(PatternKind::Text, 3, 0, 0).unwrap();
        let mut enc = StreamEncoder::<32>::new();
        enc.pattern(&header, &payload).unwrap();
        let stream = enc.finish().unwrap();

        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        feed_all(&mut rx, &mut storage, &stream);
        assert_eq!(storage.calls[1], Call::Save(*header.as_bytes(), padded(&payload)));
    }

    #[test]
    fn test_reset_discards_partial_pattern() {
        let mut rx = Receiver::new();
        let mut storage = RecordingStorage::default();
        feed_all(
            &mut rx,
            &mut storage,
            &[BYTE_START, BYTE_START, BYTE_PATTERN, BYTE_PATTERN, 0x10, 0x10, 0, 0, 1, 2],
        );
        assert_eq!(rx.state(), RxExpect::DataFirstBlock);

        rx.reset();
        assert_eq!(rx.state(), RxExpect::Start1);
        assert_eq!(rx.remaining(), 0);
        assert_eq!(storage.calls.as_slice(), &[Call::Reset]);
    }

    #[test]
    fn test_storage_failure_is_reported_and_parsing_continues() {
        let mut rx = Receiver::new();
        let mut storage = RecordingStorage {
            fail_saves: true,
            ..Default::default()
        };
        let stream = [
            BYTE_START, BYTE_START, BYTE_PATTERN, BYTE_PATTERN, 0x10, 0x01, 0, 0, b'x', BYTE_END,
        ];
        let events = feed_all(&mut rx, &mut storage, &stream);
        assert_eq!(
            events.as_slice(),
            &[
                RxEvent::StreamStarted,
                RxEvent::StorageFailed(StorageError::Full),
                RxEvent::StreamFinished(Ok(0)),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_arbitrary_input_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..2000)) {
            let mut rx = Receiver::new();
            let mut storage = RecordingStorage::default();
            for b in bytes {
                rx.feed(b, &mut storage);
                prop_assert!(rx.block_pos <= BLOCK_SIZE);
                prop_assert!(rx.header_pos <= HEADER_SIZE);
            }
        }

        #[test]
        fn prop_marker_heavy_input_never_panics(
            bytes in proptest::collection::vec(
                prop_oneof![Just(BYTE_START), Just(BYTE_PATTERN), Just(BYTE_END), any::<u8>()],
                0..2000,
            )
        ) {
            let mut rx = Receiver::new();
            let mut storage = RecordingStorage::default();
            for b in bytes {
                rx.feed(b, &mut storage);
                prop_assert!(rx.block_pos <= BLOCK_SIZE);
            }
        }
    }
}
