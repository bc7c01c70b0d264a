//! JPEG loading and raster blitting.
//!
//! Decoded images are expanded to RGBA with rows in vertically flipped
//! order: source scanline 0 becomes the last buffer row. That matches the
//! canvas's bottom-left-origin pixel writes, so a blit shows the image
//! upright.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use jpeg_decoder::{Decoder as JpegDecoder, PixelFormat};
use tracing::warn;

use crate::canvas::Canvas;
use crate::error::{Error, Result};

/// An uncompressed RGBA image, rows bottom-to-top.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes of straight-alpha RGBA.
    pub pixels: Vec<u8>,
}

/// Decode a JPEG file into a [`DecodedImage`].
///
/// 3-channel sources gain an opaque alpha channel; 4-channel sources pass
/// through unchanged; grayscale expands to gray RGB. CMYK sources are not
/// converted: their fourth byte lands in the alpha channel, so straight-alpha
/// readback of a blitted CMYK image distorts where K is below 255.
///
/// # Errors
/// Returns [`Error::ImageOpen`] if the file cannot be opened and
/// [`Error::Jpeg`] for codec failures.
pub fn load_jpeg(path: &Path) -> Result<DecodedImage> {
    let file = File::open(path).map_err(|source| Error::ImageOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut decoder = JpegDecoder::new(BufReader::new(file));
    let scanlines = decoder.decode()?;
    let info = decoder
        .info()
        .ok_or_else(|| Error::Jpeg(jpeg_decoder::Error::Format("missing image info".into())))?;

    let width = u32::from(info.width);
    let height = u32::from(info.height);
    let bpp = match info.pixel_format {
        PixelFormat::L8 => 1,
        PixelFormat::RGB24 => 3,
        PixelFormat::CMYK32 => 4,
        PixelFormat::L16 => {
            return Err(Error::Jpeg(jpeg_decoder::Error::Format(
                "16-bit grayscale JPEGs are not supported".into(),
            )));
        }
    };

    let src_stride = width as usize * bpp;
    let dst_stride = width as usize * 4;
    let mut pixels = vec![0u8; dst_stride * height as usize];
    for (row, src) in scanlines.chunks_exact(src_stride).enumerate() {
        let start = (height as usize - 1 - row) * dst_stride;
        let dst = &mut pixels[start..start + dst_stride];
        match info.pixel_format {
            PixelFormat::RGB24 => {
                for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(3)) {
                    d[..3].copy_from_slice(s);
                    d[3] = 255;
                }
            }
            PixelFormat::CMYK32 => dst.copy_from_slice(src),
            PixelFormat::L8 => {
                for (d, &v) in dst.chunks_exact_mut(4).zip(src) {
                    d[0] = v;
                    d[1] = v;
                    d[2] = v;
                    d[3] = 255;
                }
            }
            PixelFormat::L16 => unreachable!("rejected above"),
        }
    }

    Ok(DecodedImage {
        width,
        height,
        pixels,
    })
}

impl Canvas {
    /// Load a JPEG and blit it with its bottom-left corner at `(x, y)`,
    /// cropped to `w` x `h`. The decoded buffer is dropped when the call
    /// returns; a loaded image is single-use. A load failure logs a warning
    /// and draws nothing.
    pub fn draw_image(&mut self, x: i32, y: i32, w: u32, h: u32, path: &Path) {
        match load_jpeg(path) {
            Ok(image) => self.blit(x, y, w, h, &image),
            Err(err) => warn!(path = %path.display(), %err, "skipping image"),
        }
    }

    /// Raw pixel copy at device position `(x, y)` (bottom-left origin),
    /// clipped to the surface. Bypasses the current transform, as raw
    /// pixel writes in the original rendering API do.
    pub fn blit(&mut self, x: i32, y: i32, w: u32, h: u32, image: &DecodedImage) {
        let cw = i64::from(self.width());
        let ch = i64::from(self.height());
        let copy_w = i64::from(w.min(image.width));
        let copy_h = i64::from(h.min(image.height));
        let src_stride = i64::from(image.width) * 4;
        let data = self.data_mut();

        for row in 0..copy_h {
            let dev_row = ch - 1 - (i64::from(y) + row);
            if dev_row < 0 || dev_row >= ch {
                continue;
            }
            let mut src_x = 0i64;
            let mut dst_x = i64::from(x);
            let mut count = copy_w;
            if dst_x < 0 {
                src_x = -dst_x;
                count += dst_x;
                dst_x = 0;
            }
            count = count.min(cw - dst_x);
            if count <= 0 {
                continue;
            }
            let src = (row * src_stride + src_x * 4) as usize;
            let dst = ((dev_row * cw + dst_x) * 4) as usize;
            let bytes = count as usize * 4;
            data[dst..dst + bytes].copy_from_slice(&image.pixels[src..src + bytes]);
        }
    }
}
