use std::collections::BTreeMap;

use shapecanvas::{measure_text, Canvas, Color, FontData, Segment, Typeface};

const ONE: i32 = 65536;

/// 'A' is a full-em square glyph, ' ' a half-em space with no outline.
fn sample_face() -> Typeface {
    let mut character_map = BTreeMap::new();
    character_map.insert('A', 0);
    character_map.insert(' ', 1);
    let data = FontData {
        points: vec![0, 0, ONE, 0, ONE, ONE, 0, ONE],
        point_indices: vec![0, 4],
        instructions: vec![
            Segment::MoveTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::LineTo,
            Segment::Close,
        ],
        instruction_indices: vec![0, 5],
        instruction_counts: vec![5, 0],
        advances: vec![ONE, ONE / 2],
        character_map,
    };
    Typeface::build(&data).unwrap()
}

#[test]
fn empty_string_measures_zero() {
    let face = sample_face();
    assert_eq!(measure_text("", &face, 48.0), 0.0);
}

#[test]
fn measurement_is_additive_over_advances() {
    let face = sample_face();
    let a = measure_text("A", &face, 30.0);
    let sp = measure_text(" ", &face, 30.0);
    assert_eq!(a, 30.0);
    assert_eq!(sp, 15.0);
    assert_eq!(measure_text("A A", &face, 30.0), a + sp + a);
}

#[test]
fn unmapped_characters_measure_zero_width() {
    let face = sample_face();
    assert_eq!(measure_text("A\u{2713}", &face, 30.0), measure_text("A", &face, 30.0));
}

#[test]
fn draw_text_places_glyph_at_cursor() {
    let face = sample_face();
    let mut canvas = Canvas::new(100, 100).unwrap();
    canvas.begin_frame(100, 100, Color::WHITE);
    canvas.draw_text(10.0, 10.0, "A", &face, 50.0, Color::BLACK);

    // The em-square glyph covers user (10,10)..(60,60); user (35,35) is
    // raster row 100 - 35 = 65 (rounded down to pixel 64).
    let inside = canvas.pixmap().pixel(35, 64).unwrap();
    assert_eq!(inside.red(), 0);
    // Outside the glyph stays white.
    let outside = canvas.pixmap().pixel(80, 20).unwrap();
    assert_eq!(outside.red(), 255);
}

#[test]
fn draw_text_skips_unmapped_characters() {
    let face = sample_face();
    let mut canvas = Canvas::new(64, 64).unwrap();
    canvas.begin_frame(64, 64, Color::WHITE);
    canvas.draw_text(4.0, 4.0, "\u{2713}\u{2714}", &face, 20.0, Color::BLACK);
    // Nothing mapped, nothing drawn.
    assert!(canvas
        .pixmap()
        .pixels()
        .iter()
        .all(|px| px.demultiply().red() == 255));
}

#[test]
fn draw_text_leaves_transform_untouched_but_fill_persists() {
    let face = sample_face();
    let mut canvas = Canvas::new(64, 64).unwrap();
    canvas.begin_frame(64, 64, Color::WHITE);
    canvas.translate(5.0, 7.0);
    let before = canvas.transform();

    let red = Color::from_rgba8(255, 0, 0, 255);
    canvas.draw_text(0.0, 0.0, "A A", &face, 12.0, red);

    assert_eq!(canvas.transform(), before);
    assert_eq!(canvas.fill_color(), red);
}

#[test]
fn mid_alignment_centers_on_x() {
    let face = sample_face();
    let mut left = Canvas::new(80, 40).unwrap();
    let mut mid = Canvas::new(80, 40).unwrap();
    left.begin_frame(80, 40, Color::WHITE);
    mid.begin_frame(80, 40, Color::WHITE);

    let w = measure_text("A", &face, 20.0);
    left.draw_text(40.0 - w / 2.0, 10.0, "A", &face, 20.0, Color::BLACK);
    mid.draw_text_mid(40.0, 10.0, "A", &face, 20.0, Color::BLACK);

    assert_eq!(left.pixmap().data(), mid.pixmap().data());
}
