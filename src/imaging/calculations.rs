//! Pure calculation functions for preview dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `bounds` while keeping the
/// aspect ratio of `source`.
///
/// Sources that already fit are returned unchanged: previews only ever
/// shrink. Each output edge is at least 1 pixel for a non-empty source.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (max width, max height)
///
/// # Examples
/// ```
/// # use imginfo::imaging::calculate_fit_dimensions;
/// // 2:1 landscape into a square box → width-limited
/// assert_eq!(calculate_fit_dimensions((4000, 2000), (200, 200)), (200, 100));
///
/// // portrait → height-limited
/// assert_eq!(calculate_fit_dimensions((600, 800), (200, 200)), (150, 200));
///
/// // already small enough → untouched
/// assert_eq!(calculate_fit_dimensions((10, 10), (200, 200)), (10, 10));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return source;
    }
    if src_w <= max_w && src_h <= max_h {
        return source;
    }
    if max_w == 0 || max_h == 0 {
        return (0, 0);
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let box_aspect = max_w as f64 / max_h as f64;

    if src_aspect > box_aspect {
        // Source is wider: width hits the box first
        let w = max_w;
        let h = ((w as f64 / src_aspect).round() as u32).clamp(1, max_h);
        (w, h)
    } else {
        // Source is taller (or same shape): height hits the box first
        let h = max_h;
        let w = ((h as f64 * src_aspect).round() as u32).clamp(1, max_w);
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_limited_by_width() {
        assert_eq!(calculate_fit_dimensions((4000, 2000), (200, 200)), (200, 100));
        assert_eq!(calculate_fit_dimensions((1920, 1200), (200, 200)), (200, 125));
    }

    #[test]
    fn portrait_limited_by_height() {
        assert_eq!(calculate_fit_dimensions((2000, 4000), (200, 200)), (100, 200));
    }

    #[test]
    fn square_into_square() {
        assert_eq!(calculate_fit_dimensions((500, 500), (200, 200)), (200, 200));
    }

    #[test]
    fn non_square_box() {
        // 3:2 source into a 300x100 strip: height is the binding edge
        assert_eq!(calculate_fit_dimensions((3000, 2000), (300, 100)), (150, 100));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(calculate_fit_dimensions((10, 10), (200, 200)), (10, 10));
        assert_eq!(calculate_fit_dimensions((200, 50), (200, 200)), (200, 50));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(calculate_fit_dimensions((10000, 1), (200, 200)), (200, 1));
        assert_eq!(calculate_fit_dimensions((1, 10000), (200, 200)), (1, 200));
    }

    #[test]
    fn empty_source_unchanged() {
        assert_eq!(calculate_fit_dimensions((0, 0), (200, 200)), (0, 0));
        assert_eq!(calculate_fit_dimensions((0, 50), (200, 200)), (0, 50));
    }

    #[test]
    fn zero_box_yields_zero_target() {
        assert_eq!(calculate_fit_dimensions((400, 300), (0, 200)), (0, 0));
    }

    #[test]
    fn aspect_preserved_within_one_pixel() {
        for &(w, h) in &[(4000, 2000), (3024, 4032), (1234, 567), (999, 1000)] {
            let (tw, th) = calculate_fit_dimensions((w, h), (200, 200));
            assert!(tw <= 200 && th <= 200);
            let exact_h = tw as f64 * h as f64 / w as f64;
            assert!((th as f64 - exact_h).abs() <= 1.0, "{w}x{h} -> {tw}x{th}");
        }
    }
}
