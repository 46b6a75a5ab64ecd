//! Stream format for the audio link
//!
//! Stream format:
//! - START START (0xA5 0xA5): begin a new stream, erase stored patterns
//! - per pattern: PATTERN PATTERN (0x0F 0x0F), HEADER1 HEADER2 META1 META2, payload
//! - END (0x84): finish the stream
//!
//! HEADER1 high nibble is the pattern type, HEADER1 low nibble and
//! HEADER2 form the 12-bit payload length. META1/META2 carry timing and
//! direction; their meaning depends on the pattern type.

use dotbadge_hal::HEADER_SIZE;
use heapless::Vec;

/// Start-of-stream marker, sent twice
pub const BYTE_START: u8 = 0xA5;

/// Start-of-pattern marker, sent twice
pub const BYTE_PATTERN: u8 = 0x0F;

/// End-of-stream marker
pub const BYTE_END: u8 = 0x84;

/// Largest payload length the 12-bit field can carry
pub const MAX_PAYLOAD_LEN: u16 = 0x0FFF;

/// Shift of the pattern type in HEADER1
pub const KIND_SHIFT: u8 = 4;
/// Mask of the length bits 8-11 in HEADER1
pub const LENGTH_HIGH_MASK: u8 = 0x0F;

/// Mask of the high nibble of a metadata byte
pub const META_HIGH_MASK: u8 = 0xF0;
/// Mask of the low nibble of a metadata byte
pub const META_LOW_MASK: u8 = 0x0F;
/// Shift to move a nibble between the halves of a byte
pub const NIBBLE_SHIFT: u8 = 4;

/// Receive cursor of the framing state machine
///
/// The declaration order matters: every state after `Pattern2` carries
/// pattern bytes that must be stored, and every state after `Meta2`
/// carries payload bytes that count against the length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxExpect {
    /// Waiting for the first START
    Start1,
    /// Got one START
    Start2,
    /// Between patterns: START, PATTERN or END
    NextBlock,
    /// Stream started, waiting for the first PATTERN
    Pattern1,
    /// Got one PATTERN
    Pattern2,
    /// HEADER1: type and length high bits
    Header1,
    /// HEADER2: length low bits
    Header2,
    /// META1
    Meta1,
    /// META2
    Meta2,
    /// Payload bytes of the first block
    DataFirstBlock,
    /// Payload bytes of the following blocks
    Data,
}

impl RxExpect {
    /// Check if bytes received in this state belong to the pattern record
    pub fn is_record_byte(self) -> bool {
        self > RxExpect::Pattern2
    }

    /// Check if bytes received in this state are payload
    pub fn is_payload_byte(self) -> bool {
        self > RxExpect::Meta2
    }
}

/// Pattern type carried in HEADER1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PatternKind {
    /// Scrolling text, one byte per character
    Text = 1,
    /// Animation frames, eight column bytes per frame
    Frames = 2,
}

impl PatternKind {
    /// Get the type as its nibble value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a type from its nibble value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(PatternKind::Text),
            2 => Some(PatternKind::Frames),
            _ => None,
        }
    }
}

/// Errors while building a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Payload longer than the 12-bit length field allows
    PayloadTooLarge,
    /// Payload length differs from the header
    LengthMismatch,
    /// Output buffer too small
    BufferTooSmall,
}

/// The four header bytes of a pattern record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    bytes: [u8; HEADER_SIZE],
}

impl FrameHeader {
    /// Build a header from its parts
    pub fn new(kind: PatternKind, length: u16, meta1: u8, meta2: u8) -> Result<Self, EncodeError> {
        if length > MAX_PAYLOAD_LEN {
            return Err(EncodeError::PayloadTooLarge);
        }
        let [high, low] = length.to_be_bytes();
        Ok(Self {
            bytes: [
                (kind.as_u8() << KIND_SHIFT) | (high & LENGTH_HIGH_MASK),
                low,
                meta1,
                meta2,
            ],
        })
    }

    /// Wrap raw header bytes as received or loaded
    pub const fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Self {
        Self { bytes }
    }

    /// Raw header bytes
    pub fn as_bytes(&self) -> &[u8; HEADER_SIZE] {
        &self.bytes
    }

    /// Raw type nibble
    pub fn kind_bits(&self) -> u8 {
        self.bytes[0] >> KIND_SHIFT
    }

    /// Pattern type, if known
    pub fn kind(&self) -> Option<PatternKind> {
        PatternKind::from_u8(self.kind_bits())
    }

    /// Payload length in bytes
    pub fn length(&self) -> u16 {
        payload_length(self.bytes[0], self.bytes[1])
    }

    /// META1
    pub fn meta1(&self) -> u8 {
        self.bytes[2]
    }

    /// META2
    pub fn meta2(&self) -> u8 {
        self.bytes[3]
    }
}

/// Assemble the 12-bit payload length from HEADER1 and HEADER2
pub fn payload_length(header1: u8, header2: u8) -> u16 {
    (u16::from(header1 & LENGTH_HIGH_MASK) << 8) | u16::from(header2)
}

/// Builds a complete wire stream
///
/// ```
/// use dotbadge_protocol::{FrameHeader, PatternKind, StreamEncoder};
///
/// let mut enc = StreamEncoder::<64>::new();
/// let header = FrameHeader::new(PatternKind::Text, 2, 0x20, 0x00).unwrap();
/// enc.pattern(&header, b"hi").unwrap();
/// let bytes = enc.finish().unwrap();
/// assert_eq!(bytes.len(), 2 + 2 + 4 + 2 + 1);
/// ```
#[derive(Debug, Clone)]
pub struct StreamEncoder<const N: usize> {
    out: Vec<u8, N>,
}

impl<const N: usize> Default for StreamEncoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> StreamEncoder<N> {
    /// Start a stream (writes the two START markers)
    pub fn new() -> Self {
        let mut out = Vec::new();
        let _ = out.extend_from_slice(&[BYTE_START, BYTE_START]);
        Self { out }
    }

    /// Append one pattern record
    ///
    /// `payload` must be exactly as long as the header says.
    pub fn pattern(&mut self, header: &FrameHeader, payload: &[u8]) -> Result<(), EncodeError> {
        if payload.len() != usize::from(header.length()) {
            return Err(EncodeError::LengthMismatch);
        }
        self.push(&[BYTE_PATTERN, BYTE_PATTERN])?;
        self.push(header.as_bytes())?;
        self.push(payload)
    }

    /// Close the stream and return the bytes
    pub fn finish(mut self) -> Result<Vec<u8, N>, EncodeError> {
        self.push(&[BYTE_END])?;
        Ok(self.out)
    }

    fn push(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.out
            .extend_from_slice(bytes)
            .map_err(|_| EncodeError::BufferTooSmall)
    }
}
