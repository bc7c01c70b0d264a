//! Immediate-mode 2D drawing for kiosk-style displays on single-board
//! devices: shapes, text from prebuilt glyph tables, and JPEG blitting
//! onto a raster surface, presented fullscreen or captured headless.

pub mod canvas;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod fontset;
pub mod image;
mod shapes;
pub mod text;

pub use canvas::Canvas;
pub use display::{run, run_offscreen, Scene};
pub use error::{Error, Result};
pub use font::{FontData, Segment, Typeface, FIXED_ONE, MAX_GLYPHS};
pub use fontset::FontSet;
pub use image::{load_jpeg, DecodedImage};
pub use text::measure_text;

// The drawing vocabulary callers need alongside the canvas API.
pub use tiny_skia::{Color, LineCap, LineJoin, Transform};
