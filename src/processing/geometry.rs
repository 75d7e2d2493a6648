/// Resolve the output dimensions for a source image against the requested
/// width/height constraints.
///
/// Priority order:
/// 1. Both requested: used verbatim (aspect ratio is the caller's problem).
/// 2. Width only: height follows the source aspect ratio.
/// 3. Height only: width follows the source aspect ratio.
/// 4. Neither: source dimensions pass through.
///
/// A requested value of zero counts as absent. Computed dimensions are
/// rounded to the nearest integer and clamped to at least 1; there is no
/// error path.
pub fn resolve(
    src_width: u32,
    src_height: u32,
    requested_width: Option<u32>,
    requested_height: Option<u32>,
) -> (u32, u32) {
    let requested_width = requested_width.filter(|w| *w > 0);
    let requested_height = requested_height.filter(|h| *h > 0);

    match (requested_width, requested_height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => {
            let ratio = src_height as f64 / src_width as f64;
            (w, round_dimension(w as f64 * ratio))
        }
        (None, Some(h)) => {
            let ratio = src_width as f64 / src_height as f64;
            (round_dimension(h as f64 * ratio), h)
        }
        (None, None) => (src_width, src_height),
    }
}

fn round_dimension(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_dimensions_used_verbatim() {
        assert_eq!(resolve(1000, 500, Some(300), Some(300)), (300, 300));
    }

    #[test]
    fn test_width_only_preserves_aspect_ratio() {
        assert_eq!(resolve(1000, 500, Some(500), None), (500, 250));
        assert_eq!(resolve(800, 600, Some(400), None), (400, 300));
    }

    #[test]
    fn test_height_only_preserves_aspect_ratio() {
        assert_eq!(resolve(1000, 500, None, Some(250)), (500, 250));
        assert_eq!(resolve(600, 800, None, Some(400)), (300, 400));
    }

    #[test]
    fn test_neither_passes_source_through() {
        assert_eq!(resolve(800, 600, None, None), (800, 600));
    }

    #[test]
    fn test_scale_independence() {
        let (_, h1) = resolve(1000, 500, Some(200), None);
        let (_, h2) = resolve(1000, 500, Some(400), None);
        assert_eq!(h2, h1 * 2);

        let (w1, _) = resolve(640, 480, None, Some(120));
        let (w2, _) = resolve(640, 480, None, Some(240));
        assert_eq!(w2, w1 * 2);
    }

    #[test]
    fn test_zero_request_treated_as_absent() {
        assert_eq!(resolve(800, 600, Some(0), None), (800, 600));
        assert_eq!(resolve(800, 600, Some(0), Some(300)), (400, 300));
    }

    #[test]
    fn test_result_clamped_to_one() {
        // Extreme downscale of a wide strip must not collapse to zero.
        assert_eq!(resolve(10_000, 10, Some(1), None), (1, 1));
    }

    #[test]
    fn test_rounding_to_nearest() {
        // 333 * (600/800) = 249.75 -> 250
        assert_eq!(resolve(800, 600, Some(333), None), (333, 250));
    }
}
