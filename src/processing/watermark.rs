use ab_glyph::{FontRef, PxScale};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use super::error::ProcessError;
use super::{font, resize, Corner, Placement, Watermark};

/// Tilt applied to the tiled mosaic, in radians (-30 degrees).
const TILT_ANGLE: f32 = -std::f32::consts::FRAC_PI_6;

/// Corner placement margin as a fraction of the output width.
const MARGIN_FRACTION: f32 = 0.03;

/// Base text size as a fraction of the output width, before the size slider.
const BASE_FONT_FRACTION: f32 = 0.05;

/// Floor for the derived text size, in pixels.
const MIN_FONT_SIZE: f32 = 12.0;

/// Drop shadow offset (down-right), blur radius and fill.
const SHADOW_OFFSET: i32 = 2;
const SHADOW_SIGMA: f32 = 1.5;
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 77]);

/// Canvas slack past the text footprint, covering the shadow offset plus
/// the blur spread so neither is clipped at the stamp edge.
const SHADOW_MARGIN: u32 = 6;

/// Composite a watermark onto a bitmap already at its output size.
///
/// One-shot convenience over [`prepare`]: resolves ambient resources and
/// stamps a single image.
pub fn composite(
    base: RgbaImage,
    watermark: &Watermark,
    placement: &Placement,
) -> Result<RgbaImage, ProcessError> {
    prepare(watermark)?.composite(base, placement)
}

/// A watermark with its ambient resources resolved, ready to stamp any
/// number of images.
///
/// The text font is loaded here, exactly once; stamping afterwards never
/// touches the filesystem, and a font problem surfaces before the first
/// source is opened.
pub enum PreparedWatermark<'a> {
    None,
    Text {
        content: &'a str,
        color: Rgba<u8>,
        size_fraction: f32,
        opacity: f32,
        font: FontRef<'static>,
    },
    Logo {
        image: &'a RgbaImage,
        size_fraction: f32,
        opacity: f32,
    },
}

/// Resolve a watermark's ambient resources.
pub fn prepare(watermark: &Watermark) -> Result<PreparedWatermark<'_>, ProcessError> {
    Ok(match watermark {
        Watermark::None => PreparedWatermark::None,
        Watermark::Text {
            content,
            color,
            size_fraction,
            opacity,
            font,
        } => PreparedWatermark::Text {
            content: content.as_str(),
            color: *color,
            size_fraction: *size_fraction,
            opacity: *opacity,
            font: font::load_font(font)?,
        },
        Watermark::Logo {
            image,
            size_fraction,
            opacity,
        } => PreparedWatermark::Logo {
            image,
            size_fraction: *size_fraction,
            opacity: *opacity,
        },
    })
}

impl PreparedWatermark<'_> {
    /// Render the stamp for this canvas and place it.
    ///
    /// `PreparedWatermark::None` is a pass-through. Otherwise a stamp (a
    /// small RGBA tile holding the rendered text or the scaled logo, with
    /// the opacity fraction baked into its alpha channel) is rendered once
    /// and placed according to the placement mode.
    pub fn composite(
        &self,
        base: RgbaImage,
        placement: &Placement,
    ) -> Result<RgbaImage, ProcessError> {
        let stamp = match self.render_stamp(base.width())? {
            Some(stamp) => stamp,
            None => return Ok(base),
        };

        let mut base = base;
        let (width, height) = base.dimensions();
        let (stamp_width, stamp_height) = stamp.dimensions();

        match placement {
            Placement::Center => {
                let (x, y) = center_origin(width, height, stamp_width, stamp_height);
                imageops::overlay(&mut base, &stamp, x, y);
            }
            Placement::Corner(corner) => {
                let (x, y) = corner_origin(*corner, width, height, stamp_width, stamp_height);
                imageops::overlay(&mut base, &stamp, x, y);
            }
            Placement::Tiled { spacing_factor } => {
                composite_tiled(&mut base, &stamp, *spacing_factor);
            }
        }

        Ok(base)
    }

    fn render_stamp(&self, canvas_width: u32) -> Result<Option<RgbaImage>, ProcessError> {
        match self {
            PreparedWatermark::None => Ok(None),
            PreparedWatermark::Text {
                content,
                color,
                size_fraction,
                opacity,
                font,
            } => {
                let size = font_size_for(canvas_width, *size_fraction);
                let scale = PxScale::from(size);

                let (text_width, _) = text_size(scale, font, content);
                let (width, height) = text_stamp_size(text_width, size);

                let mut shadow = RgbaImage::new(width, height);
                draw_text_mut(
                    &mut shadow,
                    SHADOW_COLOR,
                    SHADOW_OFFSET,
                    SHADOW_OFFSET,
                    scale,
                    font,
                    content,
                );
                let mut stamp = gaussian_blur_f32(&shadow, SHADOW_SIGMA);
                draw_text_mut(&mut stamp, *color, 0, 0, scale, font, content);

                apply_opacity(&mut stamp, *opacity);
                Ok(Some(stamp))
            }
            PreparedWatermark::Logo {
                image,
                size_fraction,
                opacity,
            } => {
                let width = ((canvas_width as f32) * size_fraction).round().max(1.0) as u32;
                let aspect = image.width() as f32 / image.height() as f32;
                let height = ((width as f32) / aspect).round().max(1.0) as u32;

                let mut stamp = resize::resize_exact(image, width, height)?;
                apply_opacity(&mut stamp, *opacity);
                Ok(Some(stamp))
            }
        }
    }
}

/// Text size rule: 5% of the output width, scaled by the size slider,
/// never below the legibility floor.
pub(crate) fn font_size_for(canvas_width: u32, size_fraction: f32) -> f32 {
    let base = canvas_width as f32 * BASE_FONT_FRACTION;
    (base * size_fraction * 5.0).max(MIN_FONT_SIZE)
}

/// Text stamp dimensions: measured text width by the font size, plus slack
/// for the drop shadow.
pub(crate) fn text_stamp_size(text_width: u32, font_size: f32) -> (u32, u32) {
    (
        text_width.max(1) + SHADOW_MARGIN,
        (font_size.round() as u32).max(1) + SHADOW_MARGIN,
    )
}

/// Scale the alpha channel by the global opacity fraction.
pub(crate) fn apply_opacity(stamp: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity >= 1.0 {
        return;
    }
    for pixel in stamp.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
    }
}

pub(crate) fn center_origin(width: u32, height: u32, stamp_w: u32, stamp_h: u32) -> (i64, i64) {
    (
        (width as i64 - stamp_w as i64) / 2,
        (height as i64 - stamp_h as i64) / 2,
    )
}

pub(crate) fn corner_origin(
    corner: Corner,
    width: u32,
    height: u32,
    stamp_w: u32,
    stamp_h: u32,
) -> (i64, i64) {
    let pad = (width as f32 * MARGIN_FRACTION).round() as i64;
    let right = width as i64 - stamp_w as i64 - pad;
    let bottom = height as i64 - stamp_h as i64 - pad;

    match corner {
        Corner::TopLeft => (pad, pad),
        Corner::TopRight => (right, pad),
        Corner::BottomLeft => (pad, bottom),
        Corner::BottomRight => (right, bottom),
    }
}

/// Grid of tile origins for the mosaic, in output-image coordinates.
///
/// Origins overshoot the canvas by one full diagonal on both axes so that
/// the rotated pattern still covers every corner, and odd rows are shifted
/// by half a tile-plus-gap to stagger the bricks.
pub(crate) fn tile_origins(
    canvas_width: u32,
    canvas_height: u32,
    stamp_width: u32,
    stamp_height: u32,
    spacing_factor: f32,
) -> Vec<(f32, f32)> {
    let w = canvas_width as f32;
    let h = canvas_height as f32;
    let spacing = spacing_factor.max(0.0);
    let step_x = stamp_width.max(1) as f32 * (1.0 + spacing);
    let step_y = stamp_height.max(1) as f32 * (1.0 + spacing);
    let diagonal = (w * w + h * h).sqrt();

    let mut origins = Vec::new();
    let mut y = -diagonal;
    while y < h + diagonal {
        let row = (y / step_y).floor() as i64;
        let brick_offset = if row.rem_euclid(2) != 0 {
            step_x / 2.0
        } else {
            0.0
        };

        let mut x = -diagonal;
        while x < w + diagonal {
            origins.push((x + brick_offset, y));
            x += step_x;
        }
        y += step_y;
    }
    origins
}

/// Stamp the tile grid onto a square layer at least one diagonal wide,
/// rotate it about the shared center and blend the window over the base.
fn composite_tiled(base: &mut RgbaImage, stamp: &RgbaImage, spacing_factor: f32) {
    let (width, height) = base.dimensions();
    let diagonal = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
    // Two extra pixels keep the window's corners away from the layer edge,
    // where interpolation would mix in the transparent default.
    let side = diagonal.ceil() as u32 + 2;
    let pad_x = (side - width) / 2;
    let pad_y = (side - height) / 2;

    let mut layer = RgbaImage::new(side, side);
    for (x, y) in tile_origins(width, height, stamp.width(), stamp.height(), spacing_factor) {
        imageops::overlay(
            &mut layer,
            stamp,
            x.round() as i64 + pad_x as i64,
            y.round() as i64 + pad_y as i64,
        );
    }

    let rotated = rotate_about_center(&layer, TILT_ANGLE, Interpolation::Bilinear, Rgba([0, 0, 0, 0]));
    let window = imageops::crop_imm(&rotated, pad_x, pad_y, width, height).to_image();
    imageops::overlay(base, &window, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn white_logo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn test_font_size_rule() {
        // 5% of width times the slider scale.
        assert_eq!(font_size_for(800, 0.2), 40.0);
        assert_eq!(font_size_for(1000, 1.0), 250.0);
        // Legibility floor.
        assert_eq!(font_size_for(100, 0.01), 12.0);
    }

    #[test]
    fn test_center_origin() {
        assert_eq!(center_origin(200, 100, 40, 20), (80, 40));
        // Stamp wider than the canvas goes negative rather than wrapping.
        assert_eq!(center_origin(100, 100, 200, 20), (-50, 40));
    }

    #[test]
    fn test_corner_origins_use_three_percent_pad() {
        // pad = 500 * 0.03 = 15
        assert_eq!(corner_origin(Corner::TopLeft, 500, 400, 100, 50), (15, 15));
        assert_eq!(corner_origin(Corner::TopRight, 500, 400, 100, 50), (385, 15));
        assert_eq!(corner_origin(Corner::BottomLeft, 500, 400, 100, 50), (15, 335));
        assert_eq!(
            corner_origin(Corner::BottomRight, 500, 400, 100, 50),
            (385, 335)
        );
    }

    #[test]
    fn test_tile_origins_span_one_diagonal_past_the_canvas() {
        let (w, h) = (200u32, 100u32);
        let diagonal = ((w * w + h * h) as f32).sqrt();
        let origins = tile_origins(w, h, 40, 20, 1.0);
        assert!(!origins.is_empty());

        let min_x = origins.iter().map(|o| o.0).fold(f32::INFINITY, f32::min);
        let max_x = origins.iter().map(|o| o.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = origins.iter().map(|o| o.1).fold(f32::INFINITY, f32::min);
        let max_y = origins.iter().map(|o| o.1).fold(f32::NEG_INFINITY, f32::max);

        let step_x = 40.0 * 2.0;
        let step_y = 20.0 * 2.0;
        assert!(min_x <= -diagonal + 0.001);
        assert!(min_y <= -diagonal + 0.001);
        assert!(max_x >= w as f32 + diagonal - step_x);
        assert!(max_y >= h as f32 + diagonal - step_y);
    }

    #[test]
    fn test_tile_rows_are_brick_staggered() {
        let (w, h) = (120u32, 80u32);
        let diagonal = ((w * w + h * h) as f32).sqrt();
        let step_x = 30.0 * 1.5;
        let step_y = 10.0 * 1.5;

        for (x, y) in tile_origins(w, h, 30, 10, 0.5) {
            let row = (y / step_y).floor() as i64;
            let expected = if row.rem_euclid(2) != 0 { step_x / 2.0 } else { 0.0 };
            let phase = (x + diagonal).rem_euclid(step_x);
            assert!(
                (phase - expected).abs() < 0.01,
                "row {row} origin {x} has phase {phase}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_text_stamp_leaves_room_for_the_shadow() {
        assert_eq!(text_stamp_size(100, 40.0), (100 + SHADOW_MARGIN, 40 + SHADOW_MARGIN));
        // Degenerate footprints still get the slack.
        assert_eq!(text_stamp_size(0, 0.4), (1 + SHADOW_MARGIN, 1 + SHADOW_MARGIN));
        // The slack holds the full offset plus the blur spread.
        let spread = SHADOW_OFFSET + (2.0 * SHADOW_SIGMA).ceil() as i32;
        assert!(SHADOW_MARGIN as i32 >= spread);
    }

    #[test]
    fn test_prepare_needs_no_resources_for_logo_and_none() {
        assert!(matches!(
            prepare(&Watermark::None).unwrap(),
            PreparedWatermark::None
        ));

        let logo = Watermark::Logo {
            image: white_logo(4, 4),
            size_fraction: 0.1,
            opacity: 1.0,
        };
        assert!(matches!(
            prepare(&logo).unwrap(),
            PreparedWatermark::Logo { .. }
        ));
    }

    #[test]
    fn test_prepared_watermark_stamps_multiple_images() {
        let watermark = Watermark::Logo {
            image: white_logo(10, 10),
            size_fraction: 0.2,
            opacity: 1.0,
        };
        let prepared = prepare(&watermark).unwrap();

        for (w, h) in [(50u32, 40u32), (80, 60)] {
            let out = prepared
                .composite(RgbaImage::from_pixel(w, h, RED), &Placement::Center)
                .unwrap();
            assert_eq!(*out.get_pixel(w / 2, h / 2), Rgba([255, 255, 255, 255]));
        }
    }

    #[test]
    fn test_apply_opacity_scales_alpha() {
        let mut stamp = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 200]));
        apply_opacity(&mut stamp, 0.5);
        assert_eq!(stamp.get_pixel(0, 0)[3], 100);

        let mut opaque = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        apply_opacity(&mut opaque, 1.0);
        assert_eq!(opaque.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_none_watermark_is_a_passthrough() {
        let base = RgbaImage::from_pixel(30, 20, RED);
        let result = composite(base.clone(), &Watermark::None, &Placement::Center).unwrap();
        assert_eq!(result, base);
    }

    #[test]
    fn test_logo_centered_composite() {
        let base = RgbaImage::from_pixel(100, 80, RED);
        let watermark = Watermark::Logo {
            image: white_logo(20, 10),
            size_fraction: 0.2,
            opacity: 1.0,
        };

        let result = composite(base, &watermark, &Placement::Center).unwrap();

        // Stamp footprint: 20x10 centered at (40..60, 35..45).
        assert_eq!(*result.get_pixel(50, 40), Rgba([255, 255, 255, 255]));
        assert_eq!(*result.get_pixel(2, 2), RED);
        assert_eq!(*result.get_pixel(97, 77), RED);
    }

    #[test]
    fn test_logo_corner_composite_respects_pad() {
        let base = RgbaImage::from_pixel(100, 100, RED);
        let watermark = Watermark::Logo {
            image: white_logo(10, 10),
            size_fraction: 0.1,
            opacity: 1.0,
        };

        let result = composite(
            base,
            &watermark,
            &Placement::Corner(Corner::BottomRight),
        )
        .unwrap();

        // pad = 3, stamp 10x10 -> occupies (87..97, 87..97).
        assert_eq!(*result.get_pixel(90, 90), Rgba([255, 255, 255, 255]));
        assert_eq!(*result.get_pixel(98, 98), RED);
        assert_eq!(*result.get_pixel(50, 50), RED);
    }

    #[test]
    fn test_logo_opacity_blends_with_base() {
        let base = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        let watermark = Watermark::Logo {
            image: white_logo(8, 8),
            size_fraction: 0.2,
            opacity: 0.5,
        };

        let result = composite(base, &watermark, &Placement::Center).unwrap();
        let center = result.get_pixel(20, 20);
        // Half-opacity white over black lands mid-gray.
        assert!(center[0] > 100 && center[0] < 155, "got {:?}", center);
    }

    #[test]
    fn test_tiled_composite_covers_every_corner() {
        let base = RgbaImage::from_pixel(60, 40, RED);
        let watermark = Watermark::Logo {
            image: white_logo(6, 3),
            size_fraction: 0.1,
            opacity: 1.0,
        };

        let result = composite(
            base,
            &watermark,
            &Placement::Tiled { spacing_factor: 0.0 },
        )
        .unwrap();

        // Abutting tiles rotated over the whole window leave no corner red.
        for (x, y) in [(0u32, 0u32), (59, 0), (0, 39), (59, 39), (30, 20)] {
            assert_ne!(*result.get_pixel(x, y), RED, "uncovered at ({x},{y})");
        }
    }

    #[test]
    fn test_logo_stamp_preserves_aspect_ratio() {
        let base = RgbaImage::from_pixel(200, 200, RED);
        // 40x10 logo at size 0.5 -> 100x25 footprint, centered.
        let watermark = Watermark::Logo {
            image: white_logo(40, 10),
            size_fraction: 0.5,
            opacity: 1.0,
        };

        let result = composite(base, &watermark, &Placement::Center).unwrap();
        assert_eq!(*result.get_pixel(100, 100), Rgba([255, 255, 255, 255]));
        // Just above the 25px-tall band.
        assert_eq!(*result.get_pixel(100, 85), RED);
        // Just outside the 100px-wide band.
        assert_eq!(*result.get_pixel(45, 100), RED);
    }
}
