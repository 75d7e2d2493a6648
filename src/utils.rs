use anyhow::Result;
use console::style;
use image::Rgba;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use crate::cli::Args;

/// Prefix applied to every output file name.
pub const OUTPUT_PREFIX: &str = "editada";

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn has_valid_extension(path: &Path, extensions: &[String]) -> bool {
    match get_file_extension(path) {
        Some(ext) => extensions.contains(&ext),
        None => false,
    }
}

/// Derive the destination name for one output: original stem, new
/// extension, fixed prefix.
pub fn output_file_name(source_name: &str, extension: &str) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(source_name);
    format!("{OUTPUT_PREFIX}_{stem}.{extension}")
}

/// Collect source images from the input paths, in deterministic order.
///
/// Files are taken as-is; directories are walked and filtered by the
/// extension list. The combined list is sorted so batch order (and with it
/// output naming) is stable across runs.
pub fn discover_sources(input_paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();

    for input_path in input_paths {
        if input_path.is_file() {
            sources.push(input_path.clone());
            continue;
        }

        let walker = WalkDir::new(input_path).follow_links(false).max_depth(10);
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && has_valid_extension(path, extensions) {
                sources.push(path.to_path_buf());
            }
        }
    }

    sources.sort();
    Ok(sources)
}

/// Validate command line arguments
pub fn validate_inputs(args: &Args) -> Result<()> {
    if args.input_paths.is_empty() {
        return Err(anyhow::anyhow!("No input files or directories specified"));
    }

    for input_path in &args.input_paths {
        if !input_path.exists() {
            return Err(anyhow::anyhow!(
                "Input path does not exist: {}",
                input_path.display()
            ));
        }
        if !input_path.is_dir() && !input_path.is_file() {
            return Err(anyhow::anyhow!(
                "Input path is neither a file nor a directory: {}",
                input_path.display()
            ));
        }
    }

    let extensions = args.parse_extensions();
    if extensions.is_empty() {
        return Err(anyhow::anyhow!("No valid extensions specified"));
    }

    if args.opacity_percent > 100 {
        return Err(anyhow::anyhow!(
            "Opacity must be between 0 and 100, got: {}",
            args.opacity_percent
        ));
    }

    if args.size_percent == 0 {
        return Err(anyhow::anyhow!("Watermark size must be greater than 0"));
    }

    if !(0.0..=3.0).contains(&args.spacing) {
        return Err(anyhow::anyhow!(
            "Tile spacing must be between 0.0 and 3.0, got: {}",
            args.spacing
        ));
    }

    parse_hex_color(&args.color)?;

    Ok(())
}

/// Parse hex color string to an RGBA value
///
/// Supports formats: #RGB, #RRGGBB, #RRGGBBAA
pub fn parse_hex_color(color_str: &str) -> Result<Rgba<u8>> {
    if !color_str.starts_with('#') {
        return Err(anyhow::anyhow!("Color must start with #"));
    }

    let hex = &color_str[1..];

    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16)?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16)?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16)?;
            Ok(Rgba([r, g, b, 255]))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16)?;
            let g = u8::from_str_radix(&hex[2..4], 16)?;
            let b = u8::from_str_radix(&hex[4..6], 16)?;
            Ok(Rgba([r, g, b, 255]))
        }
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16)?;
            let g = u8::from_str_radix(&hex[2..4], 16)?;
            let b = u8::from_str_radix(&hex[4..6], 16)?;
            let a = u8::from_str_radix(&hex[6..8], 16)?;
            Ok(Rgba([r, g, b, a]))
        }
        _ => Err(anyhow::anyhow!("Invalid hex color format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000").unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_hex_color("#FFF").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_hex_color("#FF0000").unwrap(), Rgba([255, 0, 0, 255]));
        assert_eq!(
            parse_hex_color("#00FF0080").unwrap(),
            Rgba([0, 255, 0, 128])
        );

        assert!(parse_hex_color("FF0000").is_err()); // Missing #
        assert!(parse_hex_color("#GG0000").is_err()); // Invalid hex
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("playa.jpg", "png"), "editada_playa.png");
        assert_eq!(
            output_file_name("foto.vieja.jpeg", "webp"),
            "editada_foto.vieja.webp"
        );
        assert_eq!(output_file_name("sinext", "pdf"), "editada_sinext.pdf");
    }

    #[test]
    fn test_has_valid_extension() {
        let extensions = vec!["jpg".to_string(), "png".to_string()];
        assert!(has_valid_extension(Path::new("a/b/c.jpg"), &extensions));
        assert!(has_valid_extension(Path::new("c.PNG"), &extensions));
        assert!(!has_valid_extension(Path::new("c.gif"), &extensions));
        assert!(!has_valid_extension(Path::new("noext"), &extensions));
    }

    #[test]
    fn test_discover_sources_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "skip.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let extensions = vec!["jpg".to_string(), "png".to_string()];
        let sources = discover_sources(&[dir.path().to_path_buf()], &extensions).unwrap();

        let names: Vec<_> = sources
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(95)), "1m 35s");
    }
}
