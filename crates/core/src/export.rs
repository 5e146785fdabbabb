//! Download/export sizing and PNG rendering.

use std::io::Cursor;

use image::imageops::FilterType;
use image::ImageFormat;

use crate::error::CoreError;
use crate::image::decode_data_url;

/// HD (720p) target height.
pub const HEIGHT_HD: u32 = 720;
/// Full HD (1080p) target height.
pub const HEIGHT_FULL_HD: u32 = 1080;
/// 4K (2160p) target height.
pub const HEIGHT_4K: u32 = 2160;

/// All offered download heights.
pub const PRESET_HEIGHTS: &[u32] = &[HEIGHT_HD, HEIGHT_FULL_HD, HEIGHT_4K];

/// A PNG ready to be written out.
#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Validate that `height` is one of the [`PRESET_HEIGHTS`].
pub fn validate_preset_height(height: u32) -> Result<(), CoreError> {
    if PRESET_HEIGHTS.contains(&height) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported export height {height}. Must be one of: {PRESET_HEIGHTS:?}"
        )))
    }
}

/// Width/height for `target_height`, keeping the source aspect ratio.
pub fn target_dimensions(
    source_width: u32,
    source_height: u32,
    target_height: u32,
) -> Result<(u32, u32), CoreError> {
    if source_width == 0 || source_height == 0 || target_height == 0 {
        return Err(CoreError::Validation(
            "Image dimensions must be non-zero".to_string(),
        ));
    }
    let aspect = f64::from(source_width) / f64::from(source_height);
    let width = (f64::from(target_height) * aspect).round().max(1.0) as u32;
    Ok((width, target_height))
}

/// `<name with whitespace runs as _>_<w>x<h>.png`
pub fn download_filename(project_name: &str, width: u32, height: u32) -> String {
    let mut stem = String::with_capacity(project_name.len());
    let mut in_whitespace = false;
    for c in project_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                stem.push('_');
            }
            in_whitespace = true;
        } else {
            stem.push(c);
            in_whitespace = false;
        }
    }
    format!("{stem}_{width}x{height}.png")
}

/// Decode `data_url`, resize to `target_height` and encode as PNG.
pub fn render_png(
    data_url: &str,
    project_name: &str,
    target_height: u32,
) -> Result<RenderedExport, CoreError> {
    let (_, bytes) = decode_data_url(data_url)?;
    let source = image::load_from_memory(&bytes)
        .map_err(|e| CoreError::Validation(format!("Could not decode image: {e}")))?;

    let (width, height) = target_dimensions(source.width(), source.height(), target_height)?;
    let resized = source.resize_exact(width, height, FilterType::Lanczos3);

    let mut png = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;

    Ok(RenderedExport {
        file_name: download_filename(project_name, width, height),
        width,
        height,
        png,
    })
}
