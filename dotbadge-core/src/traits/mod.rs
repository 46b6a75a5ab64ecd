//! Collaborator traits
//!
//! These traits define what the core needs from the outside world
//! beyond the hardware traits in `dotbadge-hal`.

pub mod glyph;

pub use glyph::GlyphSource;
