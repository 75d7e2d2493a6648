use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ProcessError;
use super::ProcessedResult;

/// Fixed name for the packaged collection.
pub const ARCHIVE_NAME: &str = "imagenes_procesadas.zip";

/// Bundle processed results into a single ZIP blob.
///
/// Entry names derive from each source's original name and are kept unique:
/// distinct sources whose stems coincide after the extension swap get a
/// deterministic numeric suffix, so the archive always holds one entry per
/// result.
pub fn bundle(results: &[ProcessedResult]) -> Result<(Vec<u8>, Vec<String>), ProcessError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries: Vec<String> = Vec::with_capacity(results.len());
    for result in results {
        let name = unique_entry_name(&entries, &result.file_name());
        writer.start_file(&name, options)?;
        writer
            .write_all(&result.data)
            .map_err(zip::result::ZipError::Io)?;
        entries.push(name);
    }

    let cursor = writer.finish()?;
    Ok((cursor.into_inner(), entries))
}

fn unique_entry_name(used: &[String], candidate: &str) -> String {
    if !used.iter().any(|n| n == candidate) {
        return candidate.to_string();
    }

    let (stem, extension) = match candidate.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (candidate, ""),
    };

    let mut counter = 2;
    loop {
        let renamed = if extension.is_empty() {
            format!("{stem}_{counter}")
        } else {
            format!("{stem}_{counter}.{extension}")
        };
        if !used.iter().any(|n| *n == renamed) {
            return renamed;
        }
        counter += 1;
    }
}
