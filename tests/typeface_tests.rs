use std::collections::BTreeMap;

use shapecanvas::{FontData, Segment, Typeface, MAX_GLYPHS};

const ONE: i32 = 65536;

/// Three glyphs: a unit square, a degenerate space, and a triangle.
fn sample_font() -> FontData {
    let mut character_map = BTreeMap::new();
    character_map.insert('A', 0);
    character_map.insert(' ', 1);
    character_map.insert('B', 2);
    FontData {
        points: vec![
            0, 0, ONE, 0, ONE, ONE, 0, ONE, // square
            0, 0, ONE / 2, ONE / 2, ONE, 0, // triangle
        ],
        point_indices: vec![0, 4, 4],
        instructions: vec![
            Segment::MoveTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::Close,
            Segment::MoveTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::Close,
        ],
        instruction_indices: vec![0, 5, 5],
        instruction_counts: vec![5, 0, 4],
        advances: vec![ONE, ONE / 2, ONE],
        character_map,
    }
}

#[test]
fn build_populates_every_mapped_slot() {
    let face = Typeface::build(&sample_font()).unwrap();
    assert_eq!(face.glyph_count(), 3);

    let a = face.glyph_index('A').unwrap();
    let b = face.glyph_index('B').unwrap();
    assert!(face.glyph(a).is_some());
    assert!(face.glyph(b).is_some());
    // Distinct glyphs get distinct outlines.
    assert_ne!(face.glyph(a).unwrap().bounds(), face.glyph(b).unwrap().bounds());
}

#[test]
fn degenerate_glyph_keeps_slot_and_advance() {
    let face = Typeface::build(&sample_font()).unwrap();
    let space = face.glyph_index(' ').unwrap();
    assert!(face.glyph(space).is_none());
    assert_eq!(face.advance(space), ONE / 2);
}

#[test]
fn unmapped_character_has_no_glyph() {
    let face = Typeface::build(&sample_font()).unwrap();
    assert_eq!(face.glyph_index('Z'), None);
}

#[test]
fn overlong_table_builds_empty() {
    let n = MAX_GLYPHS + 1;
    let data = FontData {
        points: Vec::new(),
        point_indices: vec![0; n],
        instructions: Vec::new(),
        instruction_indices: vec![0; n],
        instruction_counts: vec![0; n],
        advances: vec![ONE; n],
        character_map: BTreeMap::new(),
    };
    let face = Typeface::build(&data).unwrap();
    assert!(face.is_empty());
    assert_eq!(face.glyph_count(), 0);
}

#[test]
fn build_rejects_out_of_bounds_offsets() {
    let mut data = sample_font();
    data.point_indices[2] = 1000;
    assert!(Typeface::build(&data).is_err());
}
