use std::fmt;

use crate::coords::Vec2;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Horizontal placement of one glyph along a baseline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    /// Pen position relative to the start of the run.
    pub pen_x: f32,
}

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. The platform owns the system and hands
/// raster backends a shared reference so glyphs can be rasterized on demand.
#[derive(Default)]
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl fmt::Debug for FontSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSystem").field("fonts", &self.fonts.len()).finish()
    }
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    ///
    /// Returns the `FontId` that identifies the font in a canvas's text style.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {id:?}");
        Ok(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Returns a reference to the underlying `fontdue::Font`, if `id` is valid.
    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Lays out a single line: one pen position per character, with kerning.
    ///
    /// Returns the placements and the total advance.
    pub fn layout_line(&self, text: &str, id: FontId, size: f32) -> (Vec<GlyphPlacement>, f32) {
        let Some(font) = self.get(id) else {
            return (Vec::new(), 0.0);
        };
        let mut pen = 0.0;
        let mut prev: Option<char> = None;
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            if let Some(p) = prev {
                pen += font.horizontal_kern(p, ch, size).unwrap_or(0.0);
            }
            out.push(GlyphPlacement { ch, pen_x: pen });
            pen += font.metrics(ch, size).advance_width;
            prev = Some(ch);
        }
        (out, pen)
    }

    /// Size of a single line of text: `(advance, line height)` in pixels.
    ///
    /// Unknown fonts measure as an empty run of the conventional `1.2 × size`
    /// line height.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32) -> Vec2 {
        let Some(font) = self.get(id) else {
            return Vec2::new(0.0, size * 1.2);
        };
        let (_, advance) = self.layout_line(text, id, size);
        let height = font
            .horizontal_line_metrics(size)
            .map_or(size * 1.2, |m| m.new_line_size);
        Vec2::new(advance, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_load() {
        let mut fonts = FontSystem::new();
        let err = fonts.load_font(b"definitely not a font").unwrap_err();
        assert!(err.to_string().starts_with("font load error"));
        assert!(fonts.is_empty());
    }

    #[test]
    fn unknown_font_measures_empty() {
        let fonts = FontSystem::new();
        let size = fonts.measure_text("hello", FontId(3), 10.0);
        assert_eq!(size.x, 0.0);
        assert!((size.y - 12.0).abs() < 1e-4);
        assert!(fonts.layout_line("hello", FontId(3), 10.0).0.is_empty());
    }
}
