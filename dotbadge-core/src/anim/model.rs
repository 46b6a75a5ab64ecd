//! Animation model
//!
//! A pattern record as loaded from storage is four header bytes followed
//! by the payload. The header nibbles are decoded here into the timing
//! values the engine works with.

use dotbadge_hal::HEADER_SIZE;
use dotbadge_protocol::frame::{
    payload_length, FrameHeader, PatternKind, META_HIGH_MASK, META_LOW_MASK, NIBBLE_SHIFT,
};
use heapless::Vec;

use crate::Frame;

/// Largest payload an animation holds
pub const MAX_PAYLOAD: usize = 256;

/// Added to every decoded speed so that speed is never zero
pub const SPEED_BASE: u16 = 15;

/// TEXT delay is the META1 low nibble times 16
pub const TEXT_DELAY_SHIFT: u8 = 4;

/// FRAMES delay is the META2 low nibble times 4
pub const FRAMES_DELAY_SHIFT: u8 = 2;

/// Built-in message shown while storage is empty
pub const DEFAULT_MESSAGE: &[u8] = b" \x01 Ohai - Storage is empty";

/// Speed of the built-in message: (2 << 4) + 15
pub const DEFAULT_MESSAGE_SPEED: u16 = (2 << NIBBLE_SHIFT) + SPEED_BASE;

/// Shown while the badge goes to sleep: a power symbol
pub const POWER_DOWN_IMAGE: Frame = [0x00, 0x1C, 0x22, 0x41, 0x4F, 0x41, 0x22, 0x1C];

/// Errors decoding a pattern record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelError {
    /// Record shorter than its header
    Truncated,
    /// Pattern type nibble not known
    UnknownKind(u8),
}

/// What the payload contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationKind {
    /// Characters, scrolled through the window
    Text,
    /// Eight column bytes per frame
    Frames,
}

/// Text scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Text enters on the right and moves left
    #[default]
    RightToLeft,
    /// Text enters on the left and moves right
    LeftToRight,
}

impl Direction {
    /// Decode the direction nibble: 0 is right-to-left, anything else reverses
    pub fn from_nibble(nibble: u8) -> Self {
        if nibble == 0 {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        }
    }
}

/// One loaded pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub kind: AnimationKind,
    /// Refresh ticks per animation step
    pub speed: u16,
    /// Steps to hold after a full cycle
    pub delay: u16,
    pub direction: Direction,
    pub data: Vec<u8, MAX_PAYLOAD>,
}

impl Animation {
    /// Decode a record as returned by [`dotbadge_hal::PatternStorage::load`]
    ///
    /// A payload shorter than the header claims, or longer than
    /// [`MAX_PAYLOAD`], is cut to what is available.
    pub fn from_record(record: &[u8]) -> Result<Self, ModelError> {
        let Some((header, payload)) = record.split_first_chunk::<HEADER_SIZE>() else {
            return Err(ModelError::Truncated);
        };
        let header = FrameHeader::from_bytes(*header);
        let length = usize::from(payload_length(header.as_bytes()[0], header.as_bytes()[1]));
        let payload = &payload[..length.min(payload.len()).min(MAX_PAYLOAD)];

        let (meta1, meta2) = (header.meta1(), header.meta2());
        let kind = header
            .kind()
            .ok_or(ModelError::UnknownKind(header.kind_bits()))?;

        let mut data = Vec::new();
        // Cannot fail: payload is at most MAX_PAYLOAD bytes
        let _ = data.extend_from_slice(payload);

        Ok(match kind {
            PatternKind::Text => Self {
                kind: AnimationKind::Text,
                speed: u16::from(meta1 & META_HIGH_MASK) + SPEED_BASE,
                delay: u16::from(meta1 & META_LOW_MASK) << TEXT_DELAY_SHIFT,
                direction: Direction::from_nibble(meta2 >> NIBBLE_SHIFT),
                data,
            },
            PatternKind::Frames => Self {
                kind: AnimationKind::Frames,
                speed: (u16::from(meta1 & META_LOW_MASK) << NIBBLE_SHIFT) + SPEED_BASE,
                delay: u16::from(meta2 & META_LOW_MASK) << FRAMES_DELAY_SHIFT,
                direction: Direction::RightToLeft,
                data,
            },
        })
    }

    /// The message shown when storage holds no patterns
    pub fn default_message() -> Self {
        let mut data = Vec::new();
        let _ = data.extend_from_slice(DEFAULT_MESSAGE);
        Self {
            kind: AnimationKind::Text,
            speed: DEFAULT_MESSAGE_SPEED,
            delay: 0,
            direction: Direction::RightToLeft,
            data,
        }
    }

    /// A single still frame
    pub fn still(frame: &Frame) -> Self {
        let mut data = Vec::new();
        let _ = data.extend_from_slice(frame);
        Self {
            kind: AnimationKind::Frames,
            speed: SPEED_BASE,
            delay: 0,
            direction: Direction::RightToLeft,
            data,
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
