//! dotbadge Hardware Abstraction Layer
//!
//! This crate defines the traits the badge core talks to. Chip-specific
//! crates (RP2040) and chip-independent drivers implement them, so the
//! demodulator, protocol and animation logic build and test on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  dotbadge-firmware                      │
//! └─────────────────────────────────────────┘
//!            │                    │
//!            ▼                    ▼
//! ┌────────────────────┐  ┌────────────────────┐
//! │ dotbadge-core      │  │ dotbadge-protocol  │
//! └────────────────────┘  └────────────────────┘
//!            │                    │
//!            ▼                    ▼
//! ┌─────────────────────────────────────────┐
//! │  dotbadge-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!            │                    │
//!            ▼                    ▼
//! ┌────────────────────┐  ┌────────────────────┐
//! │ dotbadge-drivers   │  │ dotbadge-hal-rp2040│
//! └────────────────────┘  └────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`matrix::MatrixPort`] - Row/column drive lines of the 8×8 matrix
//! - [`nvm::NvMemory`] - Byte-addressable non-volatile memory
//! - [`storage::PatternStorage`] - Pattern record store used by the receiver

#![no_std]
#![deny(unsafe_code)]

pub mod matrix;
pub mod nvm;
pub mod storage;

// Re-export key traits at crate root for convenience
pub use matrix::MatrixPort;
pub use nvm::{NvError, NvMemory};
pub use storage::{PatternStorage, StorageError, BLOCK_SIZE, HEADER_SIZE, RECORD_BUF_SIZE};
