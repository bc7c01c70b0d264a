//! Typeface tables built from structured glyph outline data.
//!
//! A [`FontData`] is the owned, bounds-checked description of one face:
//! shared point and instruction arrays plus per-glyph offsets, 16.16 fixed
//! point advances, and a sparse character map. [`Typeface::build`] turns it
//! into a table of renderable [`tiny_skia::Path`] handles that live for the
//! typeface's lifetime and are released together when it drops.

use std::collections::BTreeMap;

use tiny_skia::{Path, PathBuilder};
use tracing::warn;

use crate::error::{Error, Result};

/// Maximum number of glyph slots in one typeface table.
pub const MAX_GLYPHS: usize = 256;

/// Divisor turning 16.16 fixed point em units into floats.
pub const FIXED_ONE: f32 = 65536.0;

/// One outline instruction. Coordinates for each instruction follow in the
/// shared point array as x/y pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    MoveTo,
    LineTo,
    QuadTo,
    CubicTo,
    Close,
}

impl Segment {
    /// Number of x/y pairs this instruction consumes.
    #[must_use]
    pub const fn point_pairs(self) -> usize {
        match self {
            Self::Close => 0,
            Self::MoveTo | Self::LineTo => 1,
            Self::QuadTo => 2,
            Self::CubicTo => 3,
        }
    }
}

/// Glyph outline description for one face.
///
/// Coordinates are 16.16 fixed point fractions of the em square, y-up.
/// Advances are 16.16 fractions of the em as well, so a glyph drawn at
/// `size` points advances the cursor by `size * advance / 65536`.
#[derive(Debug, Clone, Default)]
pub struct FontData {
    /// Shared coordinate array, alternating x and y.
    pub points: Vec<i32>,
    /// Per-glyph start offset into `points`, counted in x/y pairs.
    pub point_indices: Vec<usize>,
    /// Shared instruction array.
    pub instructions: Vec<Segment>,
    /// Per-glyph start offset into `instructions`.
    pub instruction_indices: Vec<usize>,
    /// Per-glyph instruction count; zero marks a degenerate (space) glyph.
    pub instruction_counts: Vec<usize>,
    /// Per-glyph horizontal advance, 16.16 em fraction.
    pub advances: Vec<i32>,
    /// Sparse character map; an absent key means the face has no glyph for
    /// that character.
    pub character_map: BTreeMap<char, u16>,
}

impl FontData {
    /// Number of glyphs described.
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.advances.len()
    }

    /// Check that every per-glyph slice stays inside the shared arrays and
    /// every mapped character points at a described glyph.
    ///
    /// # Errors
    /// Returns [`Error::BadGlyphData`] naming the first offending glyph.
    pub fn validate(&self) -> Result<()> {
        let ng = self.glyph_count();
        if self.point_indices.len() != ng
            || self.instruction_indices.len() != ng
            || self.instruction_counts.len() != ng
        {
            return Err(Error::BadGlyphData(format!(
                "offset tables disagree on glyph count (advances: {ng})"
            )));
        }
        for i in 0..ng {
            let ii = self.instruction_indices[i];
            let ic = self.instruction_counts[i];
            let segs = self
                .instructions
                .get(ii..ii + ic)
                .ok_or_else(|| Error::BadGlyphData(format!("glyph {i}: instructions out of bounds")))?;
            let pairs: usize = segs.iter().map(|s| s.point_pairs()).sum();
            let first = self.point_indices[i]
                .checked_mul(2)
                .ok_or_else(|| Error::BadGlyphData(format!("glyph {i}: point offset overflow")))?;
            if first + pairs * 2 > self.points.len() {
                return Err(Error::BadGlyphData(format!("glyph {i}: points out of bounds")));
            }
        }
        for (ch, &idx) in &self.character_map {
            if usize::from(idx) >= ng {
                return Err(Error::BadGlyphData(format!(
                    "character {ch:?} maps to glyph {idx} of {ng}"
                )));
            }
        }
        Ok(())
    }
}

/// A built table of glyph paths, advances, and a character map for one font.
#[derive(Debug, Default)]
pub struct Typeface {
    glyphs: Vec<Option<Path>>,
    advances: Vec<i32>,
    character_map: BTreeMap<char, u16>,
}

impl Typeface {
    /// Build the glyph table from outline data.
    ///
    /// A description with more than [`MAX_GLYPHS`] glyphs yields an empty
    /// typeface: the table is truncated wholesale rather than partially
    /// filled, since an overlong table is a caller bug.
    ///
    /// # Errors
    /// Returns [`Error::BadGlyphData`] if the description fails validation.
    pub fn build(data: &FontData) -> Result<Self> {
        data.validate()?;
        let ng = data.glyph_count();
        if ng > MAX_GLYPHS {
            warn!(glyphs = ng, max = MAX_GLYPHS, "glyph table overflow, building empty typeface");
            return Ok(Self::default());
        }

        let mut glyphs = Vec::with_capacity(ng);
        for i in 0..ng {
            let ii = data.instruction_indices[i];
            let ic = data.instruction_counts[i];
            if ic == 0 {
                // Degenerate glyph (space): keeps its slot and advance but
                // has no outline to draw.
                glyphs.push(None);
                continue;
            }
            let segs = &data.instructions[ii..ii + ic];
            let mut at = data.point_indices[i] * 2;
            let mut pb = PathBuilder::new();
            for seg in segs {
                let mut next = || {
                    let x = data.points[at] as f32 / FIXED_ONE;
                    let y = data.points[at + 1] as f32 / FIXED_ONE;
                    at += 2;
                    (x, y)
                };
                match seg {
                    Segment::MoveTo => {
                        let (x, y) = next();
                        pb.move_to(x, y);
                    }
                    Segment::LineTo => {
                        let (x, y) = next();
                        pb.line_to(x, y);
                    }
                    Segment::QuadTo => {
                        let (cx, cy) = next();
                        let (x, y) = next();
                        pb.quad_to(cx, cy, x, y);
                    }
                    Segment::CubicTo => {
                        let (c1x, c1y) = next();
                        let (c2x, c2y) = next();
                        let (x, y) = next();
                        pb.cubic_to(c1x, c1y, c2x, c2y, x, y);
                    }
                    Segment::Close => pb.close(),
                }
            }
            glyphs.push(pb.finish());
        }

        Ok(Self {
            glyphs,
            advances: data.advances.clone(),
            character_map: data.character_map.clone(),
        })
    }

    /// Number of glyph slots in the table.
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the table holds no glyphs at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Look up the glyph slot for a character, if the face maps it.
    #[must_use]
    pub fn glyph_index(&self, ch: char) -> Option<usize> {
        let idx = usize::from(*self.character_map.get(&ch)?);
        (idx < self.glyphs.len()).then_some(idx)
    }

    /// Outline path for a glyph slot; `None` for degenerate glyphs.
    #[must_use]
    pub fn glyph(&self, index: usize) -> Option<&Path> {
        self.glyphs.get(index)?.as_ref()
    }

    /// Horizontal advance for a glyph slot, 16.16 em fraction.
    #[must_use]
    pub fn advance(&self, index: usize) -> i32 {
        self.advances.get(index).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_pair_counts() {
        assert_eq!(Segment::Close.point_pairs(), 0);
        assert_eq!(Segment::MoveTo.point_pairs(), 1);
        assert_eq!(Segment::QuadTo.point_pairs(), 2);
        assert_eq!(Segment::CubicTo.point_pairs(), 3);
    }

    #[test]
    fn validate_rejects_short_point_array() {
        let data = FontData {
            points: vec![0, 0],
            point_indices: vec![0],
            instructions: vec![Segment::MoveTo, Segment::LineTo],
            instruction_indices: vec![0],
            instruction_counts: vec![2],
            advances: vec![FIXED_ONE as i32],
            character_map: BTreeMap::new(),
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn validate_rejects_unmappable_character() {
        let mut data = FontData::default();
        data.character_map.insert('A', 3);
        assert!(data.validate().is_err());
    }
}
