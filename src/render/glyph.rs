//! Glyph Module
//!
//! Metrics and rasterization for the password-dot glyph run. The dots are
//! drawn directly as filled circles; metrics follow the usual text-extents
//! model (width/height plus bearings relative to a baseline origin) so the
//! run can be centered the same way a laid-out string would be.

use crate::config::Rgb;
use crate::render::canvas::Canvas;

/// Font size the dot geometry is derived from, before DPI scaling
pub const FONT_SIZE: f64 = 80.0;

/// Dot diameter as a fraction of the font size
const DOT_DIAMETER_RATIO: f64 = 0.40;

/// Horizontal advance between dot origins as a fraction of the font size
const DOT_ADVANCE_RATIO: f64 = 0.60;

/// Rendered extents of a glyph run, relative to its baseline origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
    pub x_bearing: f64,
    pub y_bearing: f64,
}

/// Fixed-metric dot "font" at a concrete (already DPI-scaled) size
#[derive(Debug, Clone, Copy)]
pub struct DotFont {
    size: f64,
}

impl DotFont {
    pub fn new(size: f64) -> Self {
        Self { size }
    }

    fn diameter(&self) -> f64 {
        self.size * DOT_DIAMETER_RATIO
    }

    fn advance(&self) -> f64 {
        self.size * DOT_ADVANCE_RATIO
    }

    /// Extents of a run of `count` dots
    pub fn extents(&self, count: usize) -> TextExtents {
        if count == 0 {
            return TextExtents { width: 0.0, height: 0.0, x_bearing: 0.0, y_bearing: 0.0 };
        }
        let diameter = self.diameter();
        TextExtents {
            width: (count - 1) as f64 * self.advance() + diameter,
            height: diameter,
            x_bearing: 0.0,
            // Dots sit entirely above the baseline
            y_bearing: -diameter,
        }
    }

    /// Rasterize `count` dots with their baseline origin at (x, y)
    pub fn draw(&self, canvas: &mut Canvas, x: f64, y: f64, count: usize, color: Rgb) {
        let radius = self.diameter() / 2.0;
        for i in 0..count {
            let cx = x + i as f64 * self.advance() + radius;
            let cy = y - radius;
            canvas.fill_circle(cx, cy, radius, color);
        }
    }
}

/// Baseline origin that centers a run with the given extents on a point,
/// compensating for the bearings the metrics report.
pub fn centered_origin(extents: &TextExtents, center_x: f64, center_y: f64) -> (f64, f64) {
    (
        center_x - (extents.width / 2.0 + extents.x_bearing),
        center_y - (extents.height / 2.0 + extents.y_bearing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centering_compensates_for_bearings() {
        let extents = TextExtents { width: 40.0, height: 20.0, x_bearing: 2.0, y_bearing: 3.0 };
        // Monitor {x:100, y:50, w:800, h:600} centers on (500, 350)
        let (x, y) = centered_origin(&extents, 500.0, 350.0);
        assert_eq!(x, 478.0);
        assert_eq!(y, 337.0);
    }

    #[test]
    fn test_centering_with_negative_y_bearing() {
        let font = DotFont::new(80.0);
        let extents = font.extents(1);
        let (_, y) = centered_origin(&extents, 100.0, 100.0);
        // Baseline lands below the center so the dot box straddles it
        assert!(y > 100.0);
    }

    #[test]
    fn test_empty_run_has_zero_extents() {
        let font = DotFont::new(80.0);
        assert_eq!(
            font.extents(0),
            TextExtents { width: 0.0, height: 0.0, x_bearing: 0.0, y_bearing: 0.0 }
        );
    }

    #[test]
    fn test_run_width_grows_by_advance() {
        let font = DotFont::new(80.0);
        let one = font.extents(1);
        let two = font.extents(2);
        let advance = 80.0 * 0.60;
        assert_eq!(one.width, 80.0 * 0.40);
        assert_eq!(two.width, one.width + advance);
    }

    #[test]
    fn test_metrics_scale_linearly() {
        let base = DotFont::new(80.0).extents(3);
        let doubled = DotFont::new(160.0).extents(3);
        assert_eq!(doubled.width, base.width * 2.0);
        assert_eq!(doubled.height, base.height * 2.0);
    }

    #[test]
    fn test_draw_paints_each_dot() {
        let mut canvas = Canvas::new(200, 100);
        canvas.fill(Rgb::new(0, 0, 0));
        let font = DotFont::new(80.0);
        let extents = font.extents(2);
        let (x, y) = centered_origin(&extents, 100.0, 50.0);
        font.draw(&mut canvas, x, y, 2, Rgb::new(255, 255, 255));

        let white = Rgb::new(255, 255, 255).argb();
        let painted = canvas.pixels().iter().filter(|&&p| p == white).count();
        // Two discs of radius 16: well over a thousand pixels
        assert!(painted > 1000);
    }
}
