use std::path::Path;

use anyhow::{Context, Result, ensure};
use tracing::{debug, info};

use crate::image_buf::ImageBuf;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif"];

pub fn is_supported_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// Load a standard image (JPEG, PNG, TIFF) to a linear f32 RGB ImageBuf,
/// optionally resizing so the longest edge fits within `max_edge` pixels.
/// Resizing happens in u8/sRGB space before the linear conversion.
pub fn load_image_scaled(path: &Path, max_edge: Option<u32>) -> Result<ImageBuf> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    ensure!(
        is_supported_extension(ext),
        "unsupported image type: {} (expected one of {})",
        path.display(),
        IMAGE_EXTENSIONS.join(", ")
    );

    info!(?path, "loading image file");
    let t0 = std::time::Instant::now();

    let img =
        image::open(path).with_context(|| format!("failed to open image: {}", path.display()))?;
    debug!(
        elapsed_ms = t0.elapsed().as_millis(),
        width = img.width(),
        height = img.height(),
        "image decode"
    );

    let img = match max_edge {
        Some(max) if img.width().max(img.height()) > max => img
            .resize(max, max, image::imageops::FilterType::Triangle)
            .into_rgb8(),
        _ => img.into_rgb8(),
    };

    let buf = ImageBuf::from_rgb_u8_srgb(img.width(), img.height(), img.as_raw())?;
    debug!(elapsed_ms = t0.elapsed().as_millis(), "total load");
    Ok(buf)
}
