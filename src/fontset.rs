//! Startup typeface loading.
//!
//! Resolves the configured faces through the system font database (or an
//! explicit file path) and converts each face's outlines into the owned
//! [`FontData`] description that [`Typeface::build`] consumes.

use std::collections::BTreeMap;
use std::fs;

use tracing::{debug, info};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use crate::config::{FaceSource, FontsConfig};
use crate::error::{Error, Result};
use crate::font::{FontData, Segment, Typeface, FIXED_ONE, MAX_GLYPHS};

/// Characters converted at startup: Basic Latin and the Latin-1 supplement.
const FIRST_CHAR: u32 = 0x20;
const LAST_CHAR: u32 = 0xFF;

/// The three typefaces built once at initialization and shared read-only by
/// every text operation until shutdown.
#[derive(Debug)]
pub struct FontSet {
    pub sans: Typeface,
    pub serif: Typeface,
    pub mono: Typeface,
}

impl FontSet {
    /// Resolve and build all three startup typefaces.
    ///
    /// # Errors
    /// Returns an error if any face cannot be located or parsed.
    pub fn load(cfg: &FontsConfig) -> Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "system font database loaded");
        Ok(Self {
            sans: load_face(&db, &cfg.sans, fontdb::Family::SansSerif)?,
            serif: load_face(&db, &cfg.serif, fontdb::Family::Serif)?,
            mono: load_face(&db, &cfg.mono, fontdb::Family::Monospace)?,
        })
    }
}

fn load_face(db: &fontdb::Database, src: &FaceSource, fallback: fontdb::Family) -> Result<Typeface> {
    let data = if let Some(path) = &src.path {
        let bytes = fs::read(path)?;
        font_data_from_bytes(&bytes, 0)?
    } else {
        let family = src.family.as_deref().unwrap_or_default();
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(family), fallback],
            ..fontdb::Query::default()
        };
        let id = db
            .query(&query)
            .ok_or_else(|| Error::FontNotFound(src.label()))?;
        db.with_face_data(id, |bytes, index| font_data_from_bytes(bytes, index))
            .ok_or_else(|| Error::FontNotFound(src.label()))??
    };
    let face = Typeface::build(&data)?;
    info!(face = %src.label(), glyphs = face.glyph_count(), "built typeface");
    Ok(face)
}

/// Convert one parsed font face into an owned glyph description.
///
/// Outline coordinates and advances are rescaled from font units to 16.16
/// fixed point fractions of the em square. Distinct characters sharing a
/// glyph share one table slot; conversion stops adding slots at
/// [`MAX_GLYPHS`] so the later table build never truncates.
///
/// # Errors
/// Returns [`Error::BadFont`] if the bytes do not parse as a font face.
pub fn font_data_from_bytes(bytes: &[u8], index: u32) -> Result<FontData> {
    let face = Face::parse(bytes, index).map_err(|e| Error::BadFont(e.to_string()))?;
    let scale = FIXED_ONE / f32::from(face.units_per_em());

    let mut data = FontData::default();
    let mut slots: BTreeMap<GlyphId, u16> = BTreeMap::new();
    for code in FIRST_CHAR..=LAST_CHAR {
        let Some(ch) = char::from_u32(code) else {
            continue;
        };
        let Some(gid) = face.glyph_index(ch) else {
            continue;
        };
        let slot = match slots.get(&gid) {
            Some(&slot) => slot,
            None => {
                if data.glyph_count() >= MAX_GLYPHS {
                    // Table full; later characters stay unmapped.
                    continue;
                }
                let slot = data.glyph_count() as u16;
                append_glyph(&face, gid, scale, &mut data);
                slots.insert(gid, slot);
                slot
            }
        };
        data.character_map.insert(ch, slot);
    }
    debug!(glyphs = data.glyph_count(), "converted font outlines");
    Ok(data)
}

fn append_glyph(face: &Face<'_>, gid: GlyphId, scale: f32, data: &mut FontData) {
    let mut sink = OutlineSink {
        scale,
        points: Vec::new(),
        instructions: Vec::new(),
    };
    // None for glyphs with no outline (spaces); those keep an empty slot.
    face.outline_glyph(gid, &mut sink);

    data.point_indices.push(data.points.len() / 2);
    data.instruction_indices.push(data.instructions.len());
    data.instruction_counts.push(sink.instructions.len());
    data.points.extend(sink.points);
    data.instructions.extend(sink.instructions);

    let advance = f32::from(face.glyph_hor_advance(gid).unwrap_or(0));
    data.advances.push((advance * scale).round() as i32);
}

/// Collects one glyph's outline as fixed point instruction and point runs.
struct OutlineSink {
    scale: f32,
    points: Vec<i32>,
    instructions: Vec<Segment>,
}

impl OutlineSink {
    fn push(&mut self, seg: Segment, coords: &[f32]) {
        self.instructions.push(seg);
        for &v in coords {
            self.points.push((v * self.scale).round() as i32);
        }
    }
}

impl OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(Segment::MoveTo, &[x, y]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(Segment::LineTo, &[x, y]);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(Segment::QuadTo, &[x1, y1, x, y]);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(Segment::CubicTo, &[x1, y1, x2, y2, x, y]);
    }

    fn close(&mut self) {
        self.push(Segment::Close, &[]);
    }
}
