//! RP2040-specific HAL for the badge firmware
//!
//! This crate provides RP2040 implementations of the `dotbadge-hal`
//! traits, plus RP2040-specific functionality:
//!
//! - LED matrix on embassy GPIO outputs with raised drive strength
//! - Pattern memory in the last flash sector (implements `NvMemory`)
//! - Edge timing of the audio input in demodulator ticks

#![no_std]

pub mod flash;
pub mod matrix;
pub mod pulse;

pub use flash::FlashNv;
pub use matrix::{new_matrix, RpMatrix};
pub use pulse::PulseTimer;
