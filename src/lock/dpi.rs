//! DPI Module
//!
//! Derives the scaling factor applied to the indicator's glyph geometry so
//! it keeps a consistent physical size across displays of different pixel
//! density. 96 DPI is the 1.0 baseline.

use x11rb::protocol::xproto::Screen;

const BASELINE_DPI: f64 = 96.0;

/// Scaling factor for the indicator, from a configured DPI override or the
/// root screen's physical dimensions.
pub fn scaling_factor(screen: &Screen, override_dpi: Option<f64>) -> f64 {
    let dpi = override_dpi.unwrap_or_else(|| {
        compute_dpi(screen.height_in_pixels, screen.height_in_millimeters)
    });
    dpi / BASELINE_DPI
}

/// DPI from the screen's reported pixel and millimeter heights. Screens
/// reporting no physical size (nested servers, some VMs) get the baseline.
fn compute_dpi(height_px: u16, height_mm: u16) -> f64 {
    if height_mm == 0 {
        return BASELINE_DPI;
    }
    height_px as f64 * 25.4 / height_mm as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typical_1080p_panel_is_close_to_baseline() {
        // 24" 1080p panel: 299 mm tall
        let dpi = compute_dpi(1080, 299);
        assert!((dpi - 91.7).abs() < 0.1);
    }

    #[test]
    fn test_hidpi_panel_scales_up() {
        // 13" 2560x1600 panel: 179 mm tall
        let dpi = compute_dpi(1600, 179);
        assert!(dpi > 2.0 * BASELINE_DPI);
    }

    #[test]
    fn test_missing_physical_size_uses_baseline() {
        assert_eq!(compute_dpi(1080, 0), BASELINE_DPI);
    }
}
