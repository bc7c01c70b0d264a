use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, RgbImage};
use shapecanvas::{load_jpeg, Canvas, Color, DecodedImage, Error};
use tempfile::tempdir;

fn write_jpeg(path: &Path, img: &RgbImage) {
    let file = File::create(path).unwrap();
    let mut enc = JpegEncoder::new_with_quality(BufWriter::new(file), 100);
    enc.encode_image(img).unwrap();
}

#[test]
fn missing_image_reports_open_error_without_panicking() {
    let err = load_jpeg(Path::new("/definitely/not/here.jpg")).unwrap_err();
    assert!(matches!(err, Error::ImageOpen { .. }));
}

#[test]
fn draw_image_on_missing_file_leaves_raster_untouched() {
    let mut canvas = Canvas::new(16, 16).unwrap();
    canvas.begin_frame(16, 16, Color::WHITE);
    let before = canvas.pixmap().data().to_vec();
    canvas.draw_image(0, 0, 16, 16, Path::new("/definitely/not/here.jpg"));
    assert_eq!(canvas.pixmap().data(), &before[..]);
}

#[test]
fn three_channel_jpeg_expands_to_opaque_rgba() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.jpg");
    write_jpeg(&path, &RgbImage::from_pixel(16, 16, image::Rgb([100, 150, 200])));

    let decoded = load_jpeg(&path).unwrap();
    assert_eq!((decoded.width, decoded.height), (16, 16));
    assert_eq!(decoded.pixels.len(), 16 * 16 * 4);
    for px in decoded.pixels.chunks_exact(4) {
        assert_eq!(px[3], 255);
        // Color channels survive the lossy round trip roughly intact.
        assert!((i16::from(px[0]) - 100).abs() < 16);
        assert!((i16::from(px[1]) - 150).abs() < 16);
        assert!((i16::from(px[2]) - 200).abs() < 16);
    }
}

#[test]
fn decoded_rows_are_vertically_flipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("split.jpg");
    // Top half white, bottom half black.
    let img = RgbImage::from_fn(16, 16, |_, y| {
        if y < 8 {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    });
    write_jpeg(&path, &img);

    let decoded = load_jpeg(&path).unwrap();
    let stride = 16 * 4;
    // Source scanline 0 (white) lands in the last buffer row; the first
    // buffer row holds the source bottom (black).
    let first_avg: u32 = decoded.pixels[..stride]
        .chunks_exact(4)
        .map(|px| u32::from(px[0]))
        .sum::<u32>()
        / 16;
    let last_avg: u32 = decoded.pixels[decoded.pixels.len() - stride..]
        .chunks_exact(4)
        .map(|px| u32::from(px[0]))
        .sum::<u32>()
        / 16;
    assert!(first_avg < 64, "bottom rows should be dark, got {first_avg}");
    assert!(last_avg > 192, "top rows should be light, got {last_avg}");
}

#[test]
fn grayscale_jpeg_expands_to_gray_rgba() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gray.jpg");
    let file = File::create(&path).unwrap();
    let mut enc = JpegEncoder::new_with_quality(BufWriter::new(file), 100);
    enc.encode_image(&GrayImage::from_pixel(8, 8, image::Luma([128])))
        .unwrap();
    // Drop the encoder so its BufWriter flushes before the file is read back.
    drop(enc);

    let decoded = load_jpeg(&path).unwrap();
    for px in decoded.pixels.chunks_exact(4) {
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn blit_places_buffer_rows_bottom_up() {
    // 2x2 image, rows bottom-to-top: bottom = red/green, top = blue/white.
    let image = DecodedImage {
        width: 2,
        height: 2,
        pixels: vec![
            255, 0, 0, 255, 0, 255, 0, 255, // bottom row
            0, 0, 255, 255, 255, 255, 255, 255, // top row
        ],
    };
    let mut canvas = Canvas::new(4, 4).unwrap();
    canvas.begin_frame(4, 4, Color::BLACK);
    canvas.blit(1, 1, 2, 2, &image);

    // Bottom image row sits at user y = 1, raster row 2.
    let bottom_left = canvas.pixmap().pixel(1, 2).unwrap();
    assert_eq!((bottom_left.red(), bottom_left.green()), (255, 0));
    // Top image row sits at user y = 2, raster row 1.
    let top_left = canvas.pixmap().pixel(1, 1).unwrap();
    assert_eq!((top_left.red(), top_left.blue()), (0, 255));
}

#[test]
fn blit_crops_to_requested_size_and_surface() {
    let image = DecodedImage {
        width: 2,
        height: 2,
        pixels: vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ],
    };
    let mut canvas = Canvas::new(4, 4).unwrap();
    canvas.begin_frame(4, 4, Color::BLACK);
    canvas.blit(1, 1, 1, 1, &image);

    assert_eq!(canvas.pixmap().pixel(1, 2).unwrap().red(), 255);
    // Width/height were cropped to one pixel.
    assert_eq!(canvas.pixmap().pixel(2, 2).unwrap().red(), 0);
    assert_eq!(canvas.pixmap().pixel(1, 1).unwrap().blue(), 0);

    // Off-surface placement clips instead of panicking.
    canvas.blit(-1, -1, 2, 2, &image);
    canvas.blit(3, 3, 2, 2, &image);
}
