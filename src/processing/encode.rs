use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use std::io::Cursor;

use super::error::ProcessError;
use super::{document, OutputFormat};

/// Quality factor for the JPEG re-encode path.
pub const JPEG_QUALITY: u8 = 90;

/// Quality factor for the JPEG frame embedded in the single-page document.
pub const DOCUMENT_FRAME_QUALITY: u8 = 95;

/// Serialize a composited bitmap into the requested output container,
/// returning the encoded bytes and the matching lowercase extension.
pub fn encode(img: &RgbaImage, format: OutputFormat) -> Result<(Vec<u8>, &'static str), ProcessError> {
    let (width, height) = img.dimensions();

    match format {
        OutputFormat::Png => {
            let mut buffer = Cursor::new(Vec::new());
            PngEncoder::new(&mut buffer)
                .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| encode_error("png", e))?;
            Ok((buffer.into_inner(), "png"))
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_alpha(img);
            let mut buffer = Cursor::new(Vec::new());
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| encode_error("jpeg", e))?;
            Ok((buffer.into_inner(), "jpg"))
        }
        OutputFormat::Webp => {
            let mut buffer = Cursor::new(Vec::new());
            WebPEncoder::new_lossless(&mut buffer)
                .encode(img.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| encode_error("webp", e))?;
            Ok((buffer.into_inner(), "webp"))
        }
        OutputFormat::Pdf => {
            let bytes = document::encode_single_page(img)?;
            Ok((bytes, "pdf"))
        }
    }
}

/// Encode the q95 JPEG frame for the single-page document.
pub(crate) fn encode_document_frame(img: &RgbaImage) -> Result<Vec<u8>, ProcessError> {
    let (width, height) = img.dimensions();
    let rgb = flatten_alpha(img);
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, DOCUMENT_FRAME_QUALITY)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| encode_error("pdf", e))?;
    Ok(buffer.into_inner())
}

fn flatten_alpha(img: &RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(img.clone()).to_rgb8()
}

fn encode_error(format: &'static str, source: image::ImageError) -> ProcessError {
    ProcessError::Encode {
        format,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn fixture(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 90, 255])
        })
    }

    #[test]
    fn test_png_round_trip() {
        let img = fixture(33, 17);
        let (bytes, ext) = encode(&img, OutputFormat::Png).unwrap();
        assert_eq!(ext, "png");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 33);
        assert_eq!(decoded.height(), 17);
    }

    #[test]
    fn test_jpeg_encode() {
        let img = fixture(64, 48);
        let (bytes, ext) = encode(&img, OutputFormat::Jpeg).unwrap();
        assert_eq!(ext, "jpg");

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 48);
    }

    #[test]
    fn test_webp_encode() {
        let img = fixture(20, 20);
        let (bytes, ext) = encode(&img, OutputFormat::Webp).unwrap();
        assert_eq!(ext, "webp");
        assert!(!bytes.is_empty());
        // RIFF container magic.
        assert_eq!(&bytes[..4], b"RIFF");
    }

    #[test]
    fn test_pdf_encode_has_header_and_extension() {
        let img = fixture(40, 30);
        let (bytes, ext) = encode(&img, OutputFormat::Pdf).unwrap();
        assert_eq!(ext, "pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_document_frame_is_a_jpeg() {
        let frame = encode_document_frame(&fixture(10, 10)).unwrap();
        assert_eq!(&frame[..2], &[0xFF, 0xD8]);
    }
}
