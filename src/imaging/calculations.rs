//! Pure calculation functions for crop geometry and output dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use crate::crop::{CropRegion, DisplaySelection};

/// Per-axis factor that maps display coordinates onto source pixels.
///
/// `natural / displayed` on each axis. A non-positive displayed extent is
/// treated as "shown at natural size" (factor 1).
pub fn scale_factors(natural: (u32, u32), displayed: (f64, f64)) -> (f64, f64) {
    let factor = |n: u32, d: f64| if d > 0.0 { n as f64 / d } else { 1.0 };
    (factor(natural.0, displayed.0), factor(natural.1, displayed.1))
}

/// Scale-correct a display-space selection into a source-pixel region.
///
/// Origin and extents are multiplied by the per-axis scale factor, rounded
/// to whole pixels, and clamped so the region stays inside the natural
/// bounds with at least one pixel on each axis.
///
/// # Examples
/// ```
/// # use photo_enhancer::crop::{CropRegion, DisplaySelection};
/// # use photo_enhancer::imaging::scale_selection;
/// // Image shown at half size: a 200px selection covers 400 source pixels
/// let sel = DisplaySelection {
///     x: 100.0, y: 100.0, width: 200.0, height: 200.0,
///     displayed_width: 500.0, displayed_height: 500.0,
/// };
/// assert_eq!(scale_selection(&sel, (1000, 1000)), CropRegion::new(200, 200, 400, 400));
/// ```
pub fn scale_selection(selection: &DisplaySelection, natural: (u32, u32)) -> CropRegion {
    let (natural_w, natural_h) = natural;
    let (sx, sy) = scale_factors(
        natural,
        (selection.displayed_width, selection.displayed_height),
    );

    let (x, width) = scale_span(selection.x, selection.width, sx, natural_w);
    let (y, height) = scale_span(selection.y, selection.height, sy, natural_h);

    CropRegion {
        x,
        y,
        width,
        height,
    }
}

/// Scale one axis of a selection and clamp it into `0..limit`.
fn scale_span(origin: f64, extent: f64, factor: f64, limit: u32) -> (u32, u32) {
    let limit = limit.max(1);
    let start = ((origin * factor).round().max(0.0) as u32).min(limit - 1);
    let length = ((extent * factor).round().max(1.0) as u32).min(limit - start);
    (start, length)
}

/// `width / height` as captured at upload time.
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    width as f64 / height as f64
}

/// Height that keeps `aspect` for the given width.
pub fn locked_height(width: u32, aspect: f64) -> u32 {
    (width as f64 / aspect).round() as u32
}

/// Width that keeps `aspect` for the given height.
pub fn locked_width(height: u32, aspect: f64) -> u32 {
    (height as f64 * aspect).round() as u32
}

/// Buffer size for a resize: each zero target falls back to the natural size on that axis.
pub fn resolve_target_dimensions(target: (u32, u32), natural: (u32, u32)) -> (u32, u32) {
    let pick = |t: u32, n: u32| if t == 0 { n } else { t };
    (pick(target.0, natural.0), pick(target.1, natural.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(x: f64, y: f64, w: f64, h: f64, displayed: (f64, f64)) -> DisplaySelection {
        DisplaySelection {
            x,
            y,
            width: w,
            height: h,
            displayed_width: displayed.0,
            displayed_height: displayed.1,
        }
    }

    // =========================================================================
    // scale_factors / scale_selection tests
    // =========================================================================

    #[test]
    fn scale_factors_half_size_display() {
        assert_eq!(scale_factors((1000, 800), (500.0, 400.0)), (2.0, 2.0));
    }

    #[test]
    fn scale_factors_anisotropic_display() {
        assert_eq!(scale_factors((1000, 800), (250.0, 800.0)), (4.0, 1.0));
    }

    #[test]
    fn scale_factors_zero_display_is_identity() {
        assert_eq!(scale_factors((1000, 800), (0.0, 0.0)), (1.0, 1.0));
    }

    #[test]
    fn selection_at_half_display_doubles() {
        let sel = selection(100.0, 100.0, 200.0, 200.0, (500.0, 500.0));
        assert_eq!(
            scale_selection(&sel, (1000, 1000)),
            CropRegion::new(200, 200, 400, 400)
        );
    }

    #[test]
    fn selection_at_natural_size_is_unchanged() {
        let sel = selection(10.0, 20.0, 30.0, 40.0, (100.0, 100.0));
        assert_eq!(
            scale_selection(&sel, (100, 100)),
            CropRegion::new(10, 20, 30, 40)
        );
    }

    #[test]
    fn selection_rounds_fractional_pixels() {
        // 3x scale: 33.4 → 100.2 → 100, 16.5 → 49.5 → 50
        let sel = selection(33.4, 0.0, 16.5, 10.0, (100.0, 100.0));
        let region = scale_selection(&sel, (300, 300));
        assert_eq!(region.x, 100);
        assert_eq!(region.width, 50);
    }

    #[test]
    fn selection_overflowing_edge_is_clamped() {
        let sel = selection(90.0, 90.0, 20.0, 20.0, (100.0, 100.0));
        let region = scale_selection(&sel, (100, 100));
        assert_eq!(region, CropRegion::new(90, 90, 10, 10));
        assert!(region.fits_within(100, 100));
    }

    #[test]
    fn selection_negative_origin_clamps_to_zero() {
        let sel = selection(-5.0, -5.0, 10.0, 10.0, (100.0, 100.0));
        let region = scale_selection(&sel, (100, 100));
        assert_eq!((region.x, region.y), (0, 0));
    }

    #[test]
    fn zero_extent_selection_yields_one_pixel() {
        let sel = selection(5.0, 5.0, 0.0, 0.0, (100.0, 100.0));
        let region = scale_selection(&sel, (100, 100));
        assert_eq!((region.width, region.height), (1, 1));
    }

    // =========================================================================
    // aspect lock tests
    // =========================================================================

    #[test]
    fn locked_height_for_two_to_one() {
        assert_eq!(locked_height(500, aspect_ratio(1000, 500)), 250);
    }

    #[test]
    fn locked_width_for_two_to_one() {
        assert_eq!(locked_width(250, aspect_ratio(1000, 500)), 500);
    }

    #[test]
    fn locked_dimensions_round_to_nearest() {
        // 4:3 → 100 wide is 75 tall; 101 wide is 75.75 → 76
        let aspect = aspect_ratio(4, 3);
        assert_eq!(locked_height(100, aspect), 75);
        assert_eq!(locked_height(101, aspect), 76);
        assert_eq!(locked_width(76, aspect), 101);
    }

    // =========================================================================
    // resolve_target_dimensions tests
    // =========================================================================

    #[test]
    fn resolve_uses_targets_when_set() {
        assert_eq!(resolve_target_dimensions((500, 250), (1000, 500)), (500, 250));
    }

    #[test]
    fn resolve_falls_back_per_axis() {
        assert_eq!(resolve_target_dimensions((0, 250), (1000, 500)), (1000, 250));
        assert_eq!(resolve_target_dimensions((500, 0), (1000, 500)), (500, 500));
        assert_eq!(resolve_target_dimensions((0, 0), (1000, 500)), (1000, 500));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a selection inside the display maps to a region inside the source.
        #[test]
        fn prop_scaled_region_fits_natural_bounds(
            (natural_w, natural_h) in (1u32..=4000, 1u32..=4000),
            (display_w, display_h) in (10.0f64..=2000.0, 10.0f64..=2000.0),
            (fx, fy, fw, fh) in (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0),
        ) {
            let sel = DisplaySelection {
                x: fx * display_w,
                y: fy * display_h,
                width: fw * display_w * (1.0 - fx),
                height: fh * display_h * (1.0 - fy),
                displayed_width: display_w,
                displayed_height: display_h,
            };
            let region = scale_selection(&sel, (natural_w, natural_h));
            prop_assert!(region.fits_within(natural_w, natural_h), "{region:?} outside {natural_w}x{natural_h}");
        }

        /// Property: integer scale factors map whole-pixel selections exactly.
        #[test]
        fn prop_integer_scale_is_exact(
            scale in 1u32..=4,
            (x, y) in (0u32..100, 0u32..100),
            (w, h) in (1u32..100, 1u32..100),
        ) {
            let display = 200u32;
            let sel = DisplaySelection {
                x: x as f64,
                y: y as f64,
                width: w as f64,
                height: h as f64,
                displayed_width: display as f64,
                displayed_height: display as f64,
            };
            let region = scale_selection(&sel, (display * scale, display * scale));
            prop_assert_eq!(region, CropRegion::new(x * scale, y * scale, w * scale, h * scale));
        }

        /// Property: under the lock, width/height stays within rounding of the original ratio.
        #[test]
        fn prop_locked_height_preserves_ratio(
            (natural_w, natural_h) in (1u32..=5000, 1u32..=5000),
            width in 1u32..=5000,
        ) {
            let aspect = aspect_ratio(natural_w, natural_h);
            let height = locked_height(width, aspect);
            let expected = width as f64 / aspect;
            prop_assert!((height as f64 - expected).abs() <= 0.5 + 1e-9);
        }
    }
}
