use ab_glyph::FontRef;

use super::error::ProcessError;

/// Load the font used for text watermarks.
///
/// Supports three formats:
/// 1. Font name: "Arial" -> searches system font directories
/// 2. Font filename: "Arial.ttf" -> searches in common font directories
/// 3. Full path: "/System/Library/Fonts/Supplemental/Arial.ttf" -> loads directly
pub fn load_font(font_spec: &str) -> Result<FontRef<'static>, ProcessError> {
    if is_absolute_path(font_spec) {
        return load_font_from_path(font_spec).ok_or_else(|| {
            ProcessError::Precondition(format!("font file not found at path: {font_spec}"))
        });
    }

    if is_font_filename(font_spec) {
        if let Some(font) = load_font_by_filename(font_spec) {
            return Ok(font);
        }
        // Fall through to a name-based search.
    }

    if let Some(font) = load_font_by_name(font_spec) {
        return Ok(font);
    }

    // Last resort: any common system font, bold weights first.
    let default_fonts = [
        "/System/Library/Fonts/Helvetica.ttc",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/mnt/c/Windows/Fonts/arialbd.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/mnt/c/Windows/Fonts/arial.ttf",
    ];
    for font_path in &default_fonts {
        if let Some(font) = load_font_from_path(font_path) {
            return Ok(font);
        }
    }

    Err(ProcessError::Precondition(format!(
        "no usable font found for '{font_spec}'; install system fonts or pass a font file path"
    )))
}

fn load_font_from_path(font_path: &str) -> Option<FontRef<'static>> {
    let font_data = std::fs::read(font_path).ok()?;
    FontRef::try_from_slice(Box::leak(font_data.into_boxed_slice())).ok()
}

fn load_font_by_filename(filename: &str) -> Option<FontRef<'static>> {
    for dir in font_directories() {
        let candidate = format!("{}/{}", expand_path(dir), filename);
        if std::path::Path::new(&candidate).exists() {
            if let Some(font) = load_font_from_path(&candidate) {
                return Some(font);
            }
        }
    }
    None
}

fn load_font_by_name(font_name: &str) -> Option<FontRef<'static>> {
    for path in name_candidates(font_name) {
        if let Some(font) = load_font_from_path(&expand_path(&path)) {
            return Some(font);
        }
    }
    None
}

/// Candidate paths for a font name, bold faces before regular ones: the
/// watermark is drawn in the bold weight when the system has it.
fn name_candidates(font_name: &str) -> Vec<String> {
    let normalized = font_name.to_lowercase().replace([' ', '-'], "");
    let lower = font_name.to_lowercase();

    vec![
        format!("/System/Library/Fonts/Supplemental/{font_name} Bold.ttf"),
        format!("/Library/Fonts/{font_name} Bold.ttf"),
        format!("/usr/share/fonts/truetype/{normalized}/{normalized}-Bold.ttf"),
        format!("/usr/share/fonts/TTF/{font_name}-Bold.ttf"),
        format!("/mnt/c/Windows/Fonts/{lower}bd.ttf"),
        format!("/System/Library/Fonts/{font_name}.ttf"),
        format!("/System/Library/Fonts/Supplemental/{font_name}.ttf"),
        format!("/Library/Fonts/{font_name}.ttf"),
        format!("~/Library/Fonts/{font_name}.ttf"),
        format!("/usr/share/fonts/truetype/{normalized}/{normalized}.ttf"),
        format!("/usr/share/fonts/TTF/{font_name}.ttf"),
        format!("/mnt/c/Windows/Fonts/{lower}.ttf"),
    ]
}

fn font_directories() -> Vec<&'static str> {
    vec![
        // macOS
        "/System/Library/Fonts",
        "/System/Library/Fonts/Supplemental",
        "/Library/Fonts",
        "~/Library/Fonts",
        // Linux
        "/usr/share/fonts",
        "/usr/share/fonts/truetype",
        "/usr/share/fonts/TTF",
        "/usr/local/share/fonts",
        "~/.fonts",
        "~/.local/share/fonts",
        // Windows (via WSL)
        "/mnt/c/Windows/Fonts",
    ]
}

fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/')
        || path.starts_with('\\')
        || (path.len() > 2 && path.chars().nth(1) == Some(':'))
}

fn is_font_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".ttf") || lower.ends_with(".otf") || lower.ends_with(".ttc")
}

/// Expand a leading ~ to the home directory.
fn expand_path(path: &str) -> String {
    if path.starts_with("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}
