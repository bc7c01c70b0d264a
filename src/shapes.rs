//! Shape drawing facade.
//!
//! Every operation follows one pattern: build a path, draw it with the
//! canvas's current fill and/or stroke state, and let the path drop at end
//! of scope. Nothing here escapes the call that created it.

use kurbo::{PathEl, Shape};
use tiny_skia::{Path, PathBuilder, Rect};

use crate::canvas::{Canvas, DrawMode};

/// Circle-approximation constant for cubic corner arcs.
const KAPPA: f32 = 0.552_284_75;

/// Flattening tolerance for arc-to-Bézier conversion.
const ARC_TOLERANCE: f64 = 0.1;

impl Canvas {
    /// Draw a line from `(x1, y1)` to `(x2, y2)` with the stroke state.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(x1, y1);
        pb.line_to(x2, y2);
        if let Some(path) = pb.finish() {
            self.draw_path(&path, DrawMode::Stroke);
        }
    }

    /// Draw a filled and stroked rectangle with origin `(x, y)` (bottom-left)
    /// and the given dimensions.
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.push_rect(rect);
        if let Some(path) = pb.finish() {
            self.draw_path(&path, DrawMode::FillStroke);
        }
    }

    /// Draw a rounded rectangle; `rw` and `rh` are the full width and height
    /// of the corner arcs.
    pub fn round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rw: f32, rh: f32) {
        // Degenerate sizes draw nothing; checked before the clamp below so
        // its bounds stay ordered.
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let rx = (rw / 2.0).clamp(0.0, w / 2.0);
        let ry = (rh / 2.0).clamp(0.0, h / 2.0);
        if let Some(path) = rounded_rect_path(x, y, w, h, rx, ry) {
            self.draw_path(&path, DrawMode::FillStroke);
        }
    }

    /// Draw an ellipse centered at `(cx, cy)` with full axes `w` and `h`.
    pub fn ellipse(&mut self, cx: f32, cy: f32, w: f32, h: f32) {
        let Some(oval) = Rect::from_xywh(cx - w / 2.0, cy - h / 2.0, w, h) else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.push_oval(oval);
        if let Some(path) = pb.finish() {
            self.draw_path(&path, DrawMode::FillStroke);
        }
    }

    /// Draw a circle centered at `(cx, cy)` with diameter `r`. This is an
    /// ellipse with equal axes and produces identical path geometry.
    pub fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        self.ellipse(cx, cy, r, r);
    }

    /// Draw an open elliptical arc centered at `(cx, cy)` with full axes
    /// `w` and `h`, starting at `start_deg` and sweeping `extent_deg`
    /// counterclockwise.
    pub fn arc(&mut self, cx: f32, cy: f32, w: f32, h: f32, start_deg: f32, extent_deg: f32) {
        let arc = kurbo::Arc {
            center: kurbo::Point::new(f64::from(cx), f64::from(cy)),
            radii: kurbo::Vec2::new(f64::from(w) / 2.0, f64::from(h) / 2.0),
            start_angle: f64::from(start_deg).to_radians(),
            sweep_angle: f64::from(extent_deg).to_radians(),
            x_rotation: 0.0,
        };
        let mut pb = PathBuilder::new();
        append_elements(&mut pb, arc.path_elements(ARC_TOLERANCE));
        if let Some(path) = pb.finish() {
            self.draw_path(&path, DrawMode::FillStroke);
        }
    }

    /// Draw a filled polygon with vertices taken pairwise from `xs` and `ys`.
    pub fn polygon(&mut self, xs: &[f32], ys: &[f32]) {
        if let Some(path) = poly_path(xs, ys) {
            self.draw_path(&path, DrawMode::Fill);
        }
    }

    /// Draw a stroked polyline with vertices taken pairwise from `xs` and `ys`.
    pub fn polyline(&mut self, xs: &[f32], ys: &[f32]) {
        if let Some(path) = poly_path(xs, ys) {
            self.draw_path(&path, DrawMode::Stroke);
        }
    }

    /// Draw a cubic Bézier from `(sx, sy)` to `(ex, ey)` with control points
    /// `(cx, cy)` and `(px, py)`, filled and stroked.
    #[allow(clippy::too_many_arguments)]
    pub fn cbezier(&mut self, sx: f32, sy: f32, cx: f32, cy: f32, px: f32, py: f32, ex: f32, ey: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(sx, sy);
        pb.cubic_to(cx, cy, px, py, ex, ey);
        if let Some(path) = pb.finish() {
            self.draw_path(&path, DrawMode::FillStroke);
        }
    }

    /// Draw a quadratic Bézier from `(sx, sy)` to `(ex, ey)` with control
    /// point `(cx, cy)`, filled and stroked.
    pub fn qbezier(&mut self, sx: f32, sy: f32, cx: f32, cy: f32, ex: f32, ey: f32) {
        let mut pb = PathBuilder::new();
        pb.move_to(sx, sy);
        pb.quad_to(cx, cy, ex, ey);
        if let Some(path) = pb.finish() {
            self.draw_path(&path, DrawMode::FillStroke);
        }
    }
}

/// Zip the separate coordinate slices into one open contour. The shorter
/// slice bounds the vertex count; fill closes the contour implicitly while
/// stroke leaves it open, exactly the split between polygon and polyline.
fn poly_path(xs: &[f32], ys: &[f32]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    let mut first = true;
    for (&x, &y) in xs.iter().zip(ys) {
        if first {
            pb.move_to(x, y);
            first = false;
        } else {
            pb.line_to(x, y);
        }
    }
    pb.finish()
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let (x1, y1) = (x + w, y + h);
    let mut pb = PathBuilder::new();
    pb.move_to(x + rx, y);
    pb.line_to(x1 - rx, y);
    pb.cubic_to(x1 - rx + kx, y, x1, y + ry - ky, x1, y + ry);
    pb.line_to(x1, y1 - ry);
    pb.cubic_to(x1, y1 - ry + ky, x1 - rx + kx, y1, x1 - rx, y1);
    pb.line_to(x + rx, y1);
    pb.cubic_to(x + rx - kx, y1, x, y1 - ry + ky, x, y1 - ry);
    pb.line_to(x, y + ry);
    pb.cubic_to(x, y + ry - ky, x + rx - kx, y, x + rx, y);
    pb.close();
    pb.finish()
}

/// Translate kurbo path elements into a tiny-skia path.
fn append_elements(pb: &mut PathBuilder, elements: impl Iterator<Item = PathEl>) {
    for el in elements {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
}
