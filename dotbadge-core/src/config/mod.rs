//! Configuration types
//!
//! Board-agnostic configuration structures. The firmware fills them in
//! at build time from `badge.toml`.

pub mod types;

pub use types::*;
