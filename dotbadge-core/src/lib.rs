//! Board-agnostic core logic for the badge firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Animation model (pattern records decoded into timing + payload)
//! - Animation engine (text scrolling, frame advance)
//! - Display refresh engine and the double-buffered front buffer
//! - Power/button state machine and the sleep sequence
//! - The [`Badge`] main-loop orchestrator
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod anim;
pub mod badge;
pub mod config;
pub mod display;
pub mod power;
pub mod traits;

pub use badge::{Badge, LoadError};

/// One 8×8 picture: one byte per column, bit 0 is the top row
pub type Frame = [u8; 8];

/// An all-dark frame
pub const BLANK_FRAME: Frame = [0; 8];
