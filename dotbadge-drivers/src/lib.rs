//! Driver implementations
//!
//! This crate provides chip-independent implementations of the traits
//! defined in dotbadge-hal and dotbadge-core:
//!
//! - Pattern store over any byte-addressable non-volatile memory
//! - RAM-backed memory (tests, and boards without persistent storage)
//! - LED matrix over sixteen `embedded-hal` output pins
//! - Button pair over `embedded-hal` inputs, with async wake-up
//! - 5×7 text font

#![no_std]
#![deny(unsafe_code)]

pub mod buttons;
pub mod font;
pub mod matrix;
pub mod ram;
pub mod store;

pub use buttons::ButtonPair;
pub use font::Font5x7;
pub use matrix::GpioMatrix;
pub use ram::RamNv;
pub use store::PatternStore;
