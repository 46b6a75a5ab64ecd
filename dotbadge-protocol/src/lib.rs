//! Audio Data Link
//!
//! Patterns reach the badge as audio: a pulse-width encoded square wave
//! on a single input pin. This crate turns edge timings back into
//! pattern records.
//!
//! # Pipeline
//!
//! ```text
//! edge ISR                    main loop
//! ┌─────────────┐  ┌──────┐  ┌──────────┐  ┌────────────────┐
//! │ Demodulator │─►│ Ring │─►│ Receiver │─►│ PatternStorage │
//! └─────────────┘  └──────┘  └──────────┘  └────────────────┘
//! ```
//!
//! # Stream format
//!
//! ```text
//! ┌───────┬───────┬─────────┬─────────┬────┬────┬────┬────┬─────────┐
//! │ START │ START │ PATTERN │ PATTERN │ H1 │ H2 │ M1 │ M2 │ DATA... │ ... END
//! └───────┴───────┴─────────┴─────────┴────┴────┴────┴────┴─────────┘
//! ```
//!
//! There is no checksum. The receiver resynchronises on marker bytes.

#![no_std]
#![deny(unsafe_code)]

pub mod demod;
pub mod frame;
pub mod receiver;
pub mod ring;

pub use demod::{DemodConfig, DemodEvent, Demodulator};
pub use frame::{
    FrameHeader, PatternKind, RxExpect, StreamEncoder, BYTE_END, BYTE_PATTERN, BYTE_START,
};
pub use receiver::{Receiver, RxEvent};
pub use ring::RingBuffer;
