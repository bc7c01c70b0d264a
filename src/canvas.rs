//! The raster surface and its immediate-mode drawing state.
//!
//! [`Canvas`] replaces the original library's process-wide graphics state
//! with an explicit context object: it owns the pixel buffer, the current
//! fill and stroke colors, the stroke geometry, and the user transform.
//! User coordinates are y-up with the origin at the bottom-left corner; a
//! fixed flip is composed in when geometry reaches the raster.

use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, Path, Pixmap, Rect, Stroke, Transform,
};

use crate::error::{Error, Result};

/// Which of the current paints a shape is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrawMode {
    Fill,
    Stroke,
    FillStroke,
}

/// An in-memory drawing surface plus the current drawing state.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixmap: Pixmap,
    fill: Color,
    stroke: Color,
    stroke_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    transform: Transform,
}

impl Canvas {
    /// Create a surface of `width` x `height` pixels, cleared to transparent.
    ///
    /// # Errors
    /// Returns [`Error::Surface`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(Error::Surface { width, height })?;
        Ok(Self {
            pixmap,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: 0.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            transform: Transform::identity(),
        })
    }

    /// Usable drawing area width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Usable drawing area height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Borrow the backing pixel buffer.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Raw surface bytes for direct pixel writes.
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_mut()
    }

    // --- style ---

    /// Set the fill color for subsequent drawing.
    pub fn set_fill(&mut self, color: Color) {
        self.fill = color;
    }

    /// Set the stroke color for subsequent drawing.
    pub fn set_stroke(&mut self, color: Color) {
        self.stroke = color;
    }

    /// Set the stroke width and reset the cap to butt and the join to miter.
    /// A width of zero disables stroking entirely.
    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width;
        self.line_cap = LineCap::Butt;
        self.line_join = LineJoin::Miter;
    }

    /// Set the full stroke geometry.
    pub fn set_stroke_style(&mut self, width: f32, cap: LineCap, join: LineJoin) {
        self.stroke_width = width;
        self.line_cap = cap;
        self.line_join = join;
    }

    #[must_use]
    pub fn fill_color(&self) -> Color {
        self.fill
    }

    #[must_use]
    pub fn stroke_color(&self) -> Color {
        self.stroke
    }

    #[must_use]
    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    // --- transform ---

    /// Current user transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Translate the coordinate system by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pre_translate(dx, dy);
    }

    /// Rotate the coordinate system by `degrees` counterclockwise.
    pub fn rotate(&mut self, degrees: f32) {
        self.transform = self.transform.pre_concat(Transform::from_rotate(degrees));
    }

    /// Scale the coordinate system by `(sx, sy)`.
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform.pre_concat(Transform::from_scale(sx, sy));
    }

    /// Shear the x coordinate by `sx` and the y coordinate by `sy`.
    pub fn shear(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform.pre_concat(Transform::from_skew(sx, sy));
    }

    // --- frame lifecycle ---

    /// Start a frame: clear the `width` x `height` rectangle to `clear`,
    /// then reset the style state to its deterministic defaults: opaque
    /// black fill and stroke, zero stroke width, identity transform.
    pub fn begin_frame(&mut self, width: u32, height: u32, clear: Color) {
        self.clear_rect(width, height, clear);
        self.fill = Color::BLACK;
        self.stroke = Color::BLACK;
        self.stroke_width = 0.0;
        self.line_cap = LineCap::Butt;
        self.line_join = LineJoin::Miter;
        self.transform = Transform::identity();
    }

    /// Clear a region to a background color without touching the style state.
    pub fn background(&mut self, width: u32, height: u32, color: Color) {
        self.clear_rect(width, height, color);
    }

    fn clear_rect(&mut self, width: u32, height: u32, color: Color) {
        if width >= self.width() && height >= self.height() {
            self.pixmap.fill(color);
            return;
        }
        let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color);
        // Replace pixels like the full-surface branch, never blend.
        paint.blend_mode = BlendMode::Source;
        self.pixmap.fill_rect(rect, &paint, self.flip(), None);
    }

    // --- rasterization ---

    /// The fixed user-space-to-raster flip.
    pub(crate) fn flip(&self) -> Transform {
        Transform::from_row(1.0, 0.0, 0.0, -1.0, 0.0, self.height() as f32)
    }

    /// Device transform for the current user transform.
    pub(crate) fn to_device(&self) -> Transform {
        self.flip().pre_concat(self.transform)
    }

    /// Draw a path with the current state. Even-odd fill matches the
    /// original rendering API's default fill rule; a non-positive stroke
    /// width produces no stroke geometry.
    pub(crate) fn draw_path(&mut self, path: &Path, mode: DrawMode) {
        let device = self.to_device();
        if matches!(mode, DrawMode::Fill | DrawMode::FillStroke) {
            let mut paint = Paint::default();
            paint.set_color(self.fill);
            paint.anti_alias = true;
            self.pixmap
                .fill_path(path, &paint, FillRule::EvenOdd, device, None);
        }
        if matches!(mode, DrawMode::Stroke | DrawMode::FillStroke) && self.stroke_width > 0.0 {
            let mut paint = Paint::default();
            paint.set_color(self.stroke);
            paint.anti_alias = true;
            let stroke = Stroke {
                width: self.stroke_width,
                line_cap: self.line_cap,
                line_join: self.line_join,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(path, &paint, &stroke, device, None);
        }
    }

    /// Fill a path with the current fill color under an explicit user
    /// transform, leaving the canvas transform untouched. Used by the text
    /// renderer for per-glyph placement.
    pub(crate) fn fill_path_at(&mut self, path: &Path, user: Transform) {
        let mut paint = Paint::default();
        paint.set_color(self.fill);
        paint.anti_alias = true;
        let device = self.flip().pre_concat(user);
        self.pixmap
            .fill_path(path, &paint, FillRule::EvenOdd, device, None);
    }

    // --- readback ---

    /// Straight-alpha RGBA bytes in top-to-bottom row order, the layout the
    /// presentation texture expects.
    #[must_use]
    pub fn rgba_top_down(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Straight-alpha RGBA bytes in bottom-to-top row order: the raster
    /// capture format, `width * height * 4` bytes per frame.
    #[must_use]
    pub fn raster_dump(&self) -> Vec<u8> {
        let w = self.width() as usize;
        let pixels = self.pixmap.pixels();
        let mut out = Vec::with_capacity(pixels.len() * 4);
        for row in (0..self.height() as usize).rev() {
            for px in &pixels[row * w..(row + 1) * w] {
                let c = px.demultiply();
                out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_compose_in_call_order() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.translate(10.0, 0.0);
        canvas.scale(2.0, 2.0);
        // Scale applies in the translated frame: (1, 0) maps to (12, 0).
        let t = canvas.transform();
        let mut pt = [tiny_skia::Point::from_xy(1.0, 0.0)];
        t.map_points(&mut pt);
        assert_eq!(pt[0].x, 12.0);
        assert_eq!(pt[0].y, 0.0);
    }

    #[test]
    fn flip_maps_bottom_left_to_last_row() {
        let canvas = Canvas::new(4, 4).unwrap();
        let mut pt = [tiny_skia::Point::from_xy(0.0, 0.0)];
        canvas.flip().map_points(&mut pt);
        assert_eq!(pt[0].y, 4.0);
    }
}
