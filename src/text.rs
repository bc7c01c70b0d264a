//! Text rendering: a linear left-to-right scan over glyph advances.
//!
//! No shaping, kerning, or line breaking: each character maps to at most
//! one glyph, and the cursor advances by that glyph's scaled advance width.

use tiny_skia::{Color, Transform};

use crate::canvas::Canvas;
use crate::font::{Typeface, FIXED_ONE};

impl Canvas {
    /// Draw `text` with its baseline starting at `(x, y)`.
    ///
    /// Sets the fill color once (it intentionally persists after the call),
    /// then places each glyph by composing the saved base transform with a
    /// per-glyph scale and cursor translation. Characters the face does not
    /// map are skipped without diagnostics. The canvas transform is left
    /// exactly as it was.
    pub fn draw_text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        face: &Typeface,
        point_size: f32,
        color: Color,
    ) {
        self.set_fill(color);
        let base = self.transform();
        let mut cursor = x;
        for ch in text.chars() {
            let Some(idx) = face.glyph_index(ch) else {
                continue;
            };
            if let Some(path) = face.glyph(idx) {
                let placement = base
                    .pre_translate(cursor, y)
                    .pre_concat(Transform::from_scale(point_size, point_size));
                self.fill_path_at(path, placement);
            }
            cursor += point_size * face.advance(idx) as f32 / FIXED_ONE;
        }
    }

    /// Draw `text` horizontally centered on `x`.
    pub fn draw_text_mid(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        face: &Typeface,
        point_size: f32,
        color: Color,
    ) {
        let w = measure_text(text, face, point_size);
        self.draw_text(x - w / 2.0, y, text, face, point_size, color);
    }

    /// Draw `text` ending at `x`.
    pub fn draw_text_end(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        face: &Typeface,
        point_size: f32,
        color: Color,
    ) {
        let w = measure_text(text, face, point_size);
        self.draw_text(x - w, y, text, face, point_size, color);
    }
}

/// Width of `text` at `point_size`: the same scan as drawing, with no
/// drawing. Unmapped characters contribute zero width.
#[must_use]
pub fn measure_text(text: &str, face: &Typeface, point_size: f32) -> f32 {
    let mut width = 0.0;
    for ch in text.chars() {
        if let Some(idx) = face.glyph_index(ch) {
            width += point_size * face.advance(idx) as f32 / FIXED_ONE;
        }
    }
    width
}
