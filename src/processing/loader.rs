use image::RgbaImage;
use std::path::Path;

use super::error::ProcessError;

/// Decode a source file into an RGBA bitmap.
///
/// The OS file handle is scoped to the decode call and released when it
/// returns, whether decoding succeeded or not. Unreadable or corrupt input
/// fails with a `Decode` error naming the source.
pub fn load(path: &Path) -> Result<RgbaImage, ProcessError> {
    let image = image::open(path).map_err(|source| ProcessError::Decode {
        name: display_name(path),
        source,
    })?;

    Ok(image.to_rgba8())
}

/// File name component of a source path, for error messages and output
/// naming.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("imagen")
        .to_string()
}
