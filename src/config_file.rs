use crate::cli::{Args, CornerKind, OutputKind, PlacementKind, WatermarkKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// JSON preset file, as saved by the companion web UI
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: PresetJson,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetJson {
    pub output_path: Option<String>,
    pub format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub watermark_mode: Option<String>,
    pub text: Option<String>,
    pub color: Option<String>,
    pub logo: Option<String>,
    pub placement: Option<String>,
    pub corner: Option<String>,
    pub spacing: Option<f32>,
    pub size: Option<u32>,
    pub opacity: Option<u32>,
    pub font: Option<String>,
    pub extensions: Option<String>,
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments.
    /// Command-line arguments take precedence over config file values.
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let contents = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ConfigFile = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            self.merge_from_config(config.config);

            if self.verbose {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    fn merge_from_config(&mut self, config: PresetJson) {
        // We check if arguments were explicitly provided on the command line
        let args_from_cli = std::env::args().collect::<Vec<_>>();

        if !args_from_cli.iter().any(|a| a == "-o" || a == "--output") {
            if let Some(output) = config.output_path {
                self.output_dir = PathBuf::from(output);
            }
        }

        if !args_from_cli.iter().any(|a| a == "-f" || a == "--format") {
            if let Some(format) = config.format {
                self.format = match format.as_str() {
                    "png" => OutputKind::Png,
                    "jpeg" | "jpg" => OutputKind::Jpeg,
                    "webp" => OutputKind::Webp,
                    "pdf" => OutputKind::Pdf,
                    _ => self.format,
                };
            }
        }

        if !args_from_cli.iter().any(|a| a == "--width") {
            if let Some(width) = config.width {
                self.target_width = Some(width);
            }
        }

        if !args_from_cli.iter().any(|a| a == "--height") {
            if let Some(height) = config.height {
                self.target_height = Some(height);
            }
        }

        if !args_from_cli.iter().any(|a| a == "--watermark") {
            if let Some(mode) = config.watermark_mode {
                self.watermark_mode = match mode.as_str() {
                    "none" => WatermarkKind::None,
                    "text" => WatermarkKind::Text,
                    "logo" => WatermarkKind::Logo,
                    _ => self.watermark_mode,
                };
            }
        }

        if !args_from_cli.iter().any(|a| a == "--text") {
            if let Some(text) = config.text {
                self.text = text;
            }
        }

        if !args_from_cli.iter().any(|a| a == "--color") {
            if let Some(color) = config.color {
                self.color = color;
            }
        }

        if !args_from_cli.iter().any(|a| a == "--logo") {
            if let Some(logo) = config.logo {
                self.logo = Some(PathBuf::from(logo));
            }
        }

        if !args_from_cli.iter().any(|a| a == "--placement") {
            if let Some(placement) = config.placement {
                self.placement = match placement.as_str() {
                    "center" => PlacementKind::Center,
                    "corner" => PlacementKind::Corner,
                    "tiled" => PlacementKind::Tiled,
                    _ => self.placement,
                };
            }
        }

        if !args_from_cli.iter().any(|a| a == "--corner") {
            if let Some(corner) = config.corner {
                self.corner = match corner.as_str() {
                    "tl" | "topLeft" => CornerKind::TopLeft,
                    "tr" | "topRight" => CornerKind::TopRight,
                    "bl" | "bottomLeft" => CornerKind::BottomLeft,
                    "br" | "bottomRight" => CornerKind::BottomRight,
                    _ => self.corner,
                };
            }
        }

        if !args_from_cli.iter().any(|a| a == "--spacing") {
            if let Some(spacing) = config.spacing {
                self.spacing = spacing;
            }
        }

        if !args_from_cli.iter().any(|a| a == "--size") {
            if let Some(size) = config.size {
                self.size_percent = size;
            }
        }

        if !args_from_cli.iter().any(|a| a == "--opacity") {
            if let Some(opacity) = config.opacity {
                self.opacity_percent = opacity;
            }
        }

        if !args_from_cli.iter().any(|a| a == "--font") {
            if let Some(font) = config.font {
                self.font = font;
            }
        }

        if !args_from_cli.iter().any(|a| a == "--extensions") {
            if let Some(ext) = config.extensions {
                self.extensions_str = ext;
            }
        }
    }
}
