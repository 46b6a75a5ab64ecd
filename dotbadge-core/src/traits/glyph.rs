//! Glyph table used to render text patterns

/// Column bitmaps for text characters
///
/// Columns use the same layout as a [`crate::Frame`] column: bit 0 is
/// the top row. Characters without a glyph should report width 0 or a
/// fallback glyph, never panic.
pub trait GlyphSource {
    /// Number of columns the glyph for `ch` occupies
    fn width(&self, ch: u8) -> usize;

    /// Column `index` of the glyph for `ch`
    ///
    /// Returns 0 for an out-of-range index.
    fn column(&self, ch: u8, index: usize) -> u8;
}

impl<G: GlyphSource + ?Sized> GlyphSource for &G {
    fn width(&self, ch: u8) -> usize {
        (**self).width(ch)
    }

    fn column(&self, ch: u8, index: usize) -> u8 {
        (**self).column(ch, index)
    }
}
