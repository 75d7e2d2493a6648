use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use image::RgbaImage;
use std::io::Cursor;

use super::encode;
use super::error::ProcessError;

/// Wrap a bitmap as a single full-bleed page.
///
/// The page's MediaBox is sized exactly to the bitmap's pixel dimensions,
/// so landscape versus portrait orientation follows directly from width
/// versus height. The frame is embedded as a DCT (JPEG) stream rather than
/// raw pixels to keep documents small.
pub fn encode_single_page(img: &RgbaImage) -> Result<Vec<u8>, ProcessError> {
    let (width, height) = img.dimensions();
    let frame = encode::encode_document_frame(img)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        frame,
    ));

    // Scale the unit image square to the full page, then paint it.
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width as f32).into(),
                    0.into(),
                    0.into(),
                    (height as f32).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().map_err(|e| ProcessError::Encode {
            format: "pdf",
            source: Box::new(e),
        })?,
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(width as f32),
            Object::Real(height as f32),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Cursor::new(Vec::new());
    doc.save_to(&mut buffer).map_err(|e| ProcessError::Encode {
        format: "pdf",
        source: Box::new(e),
    })?;
    Ok(buffer.into_inner())
}
