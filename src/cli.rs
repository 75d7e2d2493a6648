use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::processing::error::ProcessError;
use crate::processing::{loader, Corner, OutputFormat, OutputSpec, Placement, Watermark};
use crate::utils::parse_hex_color;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputKind {
    /// Lossless PNG
    #[value(name = "png")]
    Png,
    /// JPEG at quality 90
    #[value(name = "jpeg", alias = "jpg")]
    Jpeg,
    /// Lossless WebP
    #[value(name = "webp")]
    Webp,
    /// Single-page PDF document sized to the image
    #[value(name = "pdf")]
    Pdf,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum WatermarkKind {
    /// No watermark
    #[value(name = "none")]
    None,
    /// Text watermark with drop shadow
    #[value(name = "text")]
    Text,
    /// Logo image watermark
    #[value(name = "logo")]
    Logo,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PlacementKind {
    /// Single watermark in the middle of the image
    #[value(name = "center")]
    Center,
    /// Single watermark inset from a corner (see --corner)
    #[value(name = "corner")]
    Corner,
    /// Rotated brick mosaic across the whole image (see --spacing)
    #[value(name = "tiled")]
    Tiled,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CornerKind {
    #[value(name = "tl")]
    TopLeft,
    #[value(name = "tr")]
    TopRight,
    #[value(name = "bl")]
    BottomLeft,
    #[value(name = "br")]
    BottomRight,
}

impl From<CornerKind> for Corner {
    fn from(kind: CornerKind) -> Self {
        match kind {
            CornerKind::TopLeft => Corner::TopLeft,
            CornerKind::TopRight => Corner::TopRight,
            CornerKind::BottomLeft => Corner::BottomLeft,
            CornerKind::BottomRight => Corner::BottomRight,
        }
    }
}

impl From<OutputKind> for OutputFormat {
    fn from(kind: OutputKind) -> Self {
        match kind {
            OutputKind::Png => OutputFormat::Png,
            OutputKind::Jpeg => OutputFormat::Jpeg,
            OutputKind::Webp => OutputFormat::Webp,
            OutputKind::Pdf => OutputFormat::Pdf,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "imagina-processor",
    about = "Batch image converter and watermark tool",
    long_about = "
ImaginA Tools - Image Processor

Resizes, re-encodes and watermarks images in batch. A single input produces
a single output file; multiple inputs are packaged into one ZIP archive.

Example Usage:
  # Re-encode a folder of photos as WebP, scaled to 1200px wide
  imagina-processor -i ~/Fotos -o ~/salida -f webp --width 1200

  # Text watermark tiled across every image
  imagina-processor -i ~/Fotos -o ~/salida --watermark text \\
    --text \"© ImaginA\" --placement tiled --spacing 1.5 --opacity 40

  # Logo watermark in the bottom-right corner of one image
  imagina-processor -i foto.jpg -o . --watermark logo --logo marca.png \\
    --placement corner --corner br --size 25

  # Wrap each image as a single-page PDF
  imagina-processor -i ~/Escaneos -o ~/salida -f pdf"
)]
pub struct Args {
    /// Input image files or directories (can be specified multiple times)
    #[arg(short = 'i', long = "input", required = true, value_name = "DIR|FILE")]
    pub input_paths: Vec<PathBuf>,

    /// Output directory for processed images
    #[arg(short = 'o', long = "output", default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Target width in pixels; height follows the aspect ratio unless also given
    #[arg(long = "width", value_name = "PIXELS")]
    pub target_width: Option<u32>,

    /// Target height in pixels; width follows the aspect ratio unless also given
    #[arg(long = "height", value_name = "PIXELS")]
    pub target_height: Option<u32>,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "png")]
    pub format: OutputKind,

    /// Watermark mode
    #[arg(long = "watermark", default_value = "none")]
    pub watermark_mode: WatermarkKind,

    /// Watermark text (text mode)
    #[arg(long = "text", default_value = "© ImaginA", value_name = "STRING")]
    pub text: String,

    /// Watermark text color (hex: #RGB, #RRGGBB or #RRGGBBAA)
    #[arg(long = "color", default_value = "#FFFFFF", value_name = "COLOR")]
    pub color: String,

    /// Logo image file (logo mode)
    #[arg(long = "logo", value_name = "FILE")]
    pub logo: Option<PathBuf>,

    /// Watermark placement
    #[arg(long = "placement", default_value = "center")]
    pub placement: PlacementKind,

    /// Corner for corner placement
    #[arg(long = "corner", default_value = "br")]
    pub corner: CornerKind,

    /// Gap between tiles as a multiple of the watermark size (tiled placement)
    #[arg(long = "spacing", default_value = "1.0", value_name = "FACTOR")]
    pub spacing: f32,

    /// Watermark size as a percent of the image width
    #[arg(long = "size", default_value = "20", value_name = "PERCENT")]
    pub size_percent: u32,

    /// Watermark opacity percent (0-100)
    #[arg(long = "opacity", default_value = "50", value_name = "PERCENT")]
    pub opacity_percent: u32,

    /// Font for text watermarks. Supports three formats:
    /// - Font name: "Arial" (searches system fonts)
    /// - Font filename: "Arial.ttf" (searches in font directories)
    /// - Full path: "/usr/share/fonts/TTF/Arial.ttf" (loads directly)
    #[arg(long = "font", default_value = "Arial", value_name = "FONT")]
    pub font: String,

    /// Comma-separated list of image extensions accepted from directories
    #[arg(long = "extensions", default_value = "jpg,jpeg,png,webp")]
    pub extensions_str: String,

    /// JSON preset file merged under explicitly passed flags
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Parse the extensions string into a vector
    pub fn parse_extensions(&self) -> Vec<String> {
        self.extensions_str
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Assemble the engine configuration.
    ///
    /// Raises a precondition error when logo mode is selected without a
    /// logo file, before any source image is opened.
    pub fn build_spec(&self) -> Result<OutputSpec, ProcessError> {
        let size_fraction = self.size_percent as f32 / 100.0;
        let opacity = (self.opacity_percent.min(100)) as f32 / 100.0;

        let watermark = match self.watermark_mode {
            WatermarkKind::None => Watermark::None,
            WatermarkKind::Text => Watermark::Text {
                content: if self.text.trim().is_empty() {
                    "© ImaginA".to_string()
                } else {
                    self.text.clone()
                },
                color: parse_hex_color(&self.color)
                    .map_err(|e| ProcessError::Precondition(e.to_string()))?,
                size_fraction,
                opacity,
                font: self.font.clone(),
            },
            WatermarkKind::Logo => {
                let logo_path = self.logo.as_ref().ok_or_else(|| {
                    ProcessError::Precondition(
                        "logo watermark selected but no logo file was provided".to_string(),
                    )
                })?;
                Watermark::Logo {
                    image: loader::load(logo_path)?,
                    size_fraction,
                    opacity,
                }
            }
        };

        let placement = match self.placement {
            PlacementKind::Center => Placement::Center,
            PlacementKind::Corner => Placement::Corner(self.corner.into()),
            PlacementKind::Tiled => Placement::Tiled {
                spacing_factor: self.spacing.max(0.0),
            },
        };

        Ok(OutputSpec {
            target_width: self.target_width.filter(|w| *w > 0),
            target_height: self.target_height.filter(|h| *h > 0),
            format: self.format.into(),
            watermark,
            placement,
        })
    }
}


// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            input_paths: vec![],
            output_dir: PathBuf::from("."),
            target_width: None,
            target_height: None,
            format: OutputKind::Png,
            watermark_mode: WatermarkKind::None,
            text: "© ImaginA".to_string(),
            color: "#FFFFFF".to_string(),
            logo: None,
            placement: PlacementKind::Center,
            corner: CornerKind::BottomRight,
            spacing: 1.0,
            size_percent: 20,
            opacity_percent: 50,
            font: "Arial".to_string(),
            extensions_str: "jpg,jpeg,png,webp".to_string(),
            config_file: None,
            verbose: false,
        }
    }
}
