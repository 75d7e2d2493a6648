pub mod archive;
pub mod document;
pub mod encode;
pub mod error;
pub mod font;
pub mod geometry;
pub mod loader;
pub mod resize;
pub mod watermark;

use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use error::ProcessError;

/// Target output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
    /// Single-page PDF document wrapping the bitmap full-bleed.
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
            OutputFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Watermark placement strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Center,
    Corner(Corner),
    /// Rotated brick mosaic; `spacing_factor` is a multiplier of the
    /// watermark's own footprint (0 = abutting tiles).
    Tiled { spacing_factor: f32 },
}

/// Watermark content. Fractions are normalized: opacity to [0,1], size to
/// the slider's 0..1+ range.
#[derive(Debug, Clone)]
pub enum Watermark {
    None,
    Text {
        content: String,
        color: Rgba<u8>,
        size_fraction: f32,
        opacity: f32,
        font: String,
    },
    Logo {
        image: RgbaImage,
        size_fraction: f32,
        opacity: f32,
    },
}

/// Immutable configuration for one batch run, read by every pass.
#[derive(Debug, Clone)]
pub struct OutputSpec {
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub format: OutputFormat,
    pub watermark: Watermark,
    pub placement: Placement,
}

/// One encoded output, ready for naming and packaging.
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    pub data: Vec<u8>,
    pub extension: &'static str,
    pub source_name: String,
}

impl ProcessedResult {
    /// Destination file name: original stem, new extension, output prefix.
    pub fn file_name(&self) -> String {
        crate::utils::output_file_name(&self.source_name, self.extension)
    }
}

/// Result of a batch run: a lone file, or a ZIP with one entry per source.
#[derive(Debug)]
pub enum BatchOutcome {
    Single(ProcessedResult),
    Archive {
        name: String,
        data: Vec<u8>,
        entries: Vec<String>,
    },
}

/// Sequential batch orchestrator.
///
/// Sources are processed strictly in input order, one at a time; each
/// decoded bitmap is dropped before the next source is opened, so peak
/// memory stays at roughly one full-resolution frame regardless of batch
/// size. Any per-item failure aborts the whole run.
pub struct ProcessingEngine {
    spec: OutputSpec,
}

impl ProcessingEngine {
    pub fn new(spec: OutputSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    /// Run the batch, invoking `progress(done, total)` after each item.
    ///
    /// Ambient watermark resources (the text font) are resolved once here,
    /// before the first source is opened.
    pub fn run<F>(&self, sources: &[PathBuf], mut progress: F) -> Result<BatchOutcome, ProcessError>
    where
        F: FnMut(usize, usize),
    {
        if sources.is_empty() {
            return Err(ProcessError::Precondition(
                "no input images to process".to_string(),
            ));
        }

        let total = sources.len();
        let prepared = watermark::prepare(&self.spec.watermark)?;

        if let [source] = sources {
            let result = self.process_single(source, &prepared)?;
            progress(1, 1);
            return Ok(BatchOutcome::Single(result));
        }

        let mut results = Vec::with_capacity(total);
        for (index, source) in sources.iter().enumerate() {
            let result = self.process_single(source, &prepared)?;
            results.push(result);
            progress(index + 1, total);
        }

        let (data, entries) = archive::bundle(&results)?;
        Ok(BatchOutcome::Archive {
            name: archive::ARCHIVE_NAME.to_string(),
            data,
            entries,
        })
    }

    /// Load -> resolve -> resize -> composite -> encode for one source.
    fn process_single(
        &self,
        source: &Path,
        watermark: &watermark::PreparedWatermark<'_>,
    ) -> Result<ProcessedResult, ProcessError> {
        let bitmap = loader::load(source)?;

        let (out_width, out_height) = geometry::resolve(
            bitmap.width(),
            bitmap.height(),
            self.spec.target_width,
            self.spec.target_height,
        );

        let bitmap = if (out_width, out_height) != bitmap.dimensions() {
            resize::resize_exact(&bitmap, out_width, out_height)?
        } else {
            bitmap
        };

        let bitmap = watermark.composite(bitmap, &self.spec.placement)?;

        let (data, extension) = encode::encode(&bitmap, self.spec.format)?;

        Ok(ProcessedResult {
            data,
            extension,
            source_name: loader::display_name(source),
        })
    }
}
