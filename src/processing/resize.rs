use fast_image_resize::{images::Image, ResizeOptions, Resizer};
use image::RgbaImage;

use super::error::ProcessError;

/// Resize an RGBA bitmap to exact dimensions using a high-quality filter.
///
/// Returns a clone when the dimensions already match.
pub fn resize_exact(img: &RgbaImage, width: u32, height: u32) -> Result<RgbaImage, ProcessError> {
    let (src_width, src_height) = img.dimensions();

    if src_width == width && src_height == height {
        return Ok(img.clone());
    }

    let width = width.max(1);
    let height = height.max(1);

    let src_image = Image::from_vec_u8(
        src_width,
        src_height,
        img.as_raw().clone(),
        fast_image_resize::PixelType::U8x4,
    )
    .map_err(|e| ProcessError::Resize(Box::new(e)))?;

    let mut dst_image = Image::new(width, height, fast_image_resize::PixelType::U8x4);

    let mut resizer = Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, Some(&ResizeOptions::default()))
        .map_err(|e| ProcessError::Resize(Box::new(e)))?;

    RgbaImage::from_raw(width, height, dst_image.buffer().to_vec()).ok_or_else(|| {
        ProcessError::Resize("resized buffer does not match target dimensions".into())
    })
}
