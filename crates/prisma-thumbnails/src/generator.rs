use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use prisma_core::ImageBuf;
use prisma_core::pipeline::FilterCell;

/// Grid cell size in pixels.
pub const CELL_WIDTH: u32 = 150;
pub const CELL_HEIGHT: u32 = 200;

/// Convert an ImageBuf to an 8-bit sRGB RGBA image.
pub fn to_rgba_image(buf: &ImageBuf) -> Result<RgbaImage> {
    RgbaImage::from_raw(buf.width, buf.height, buf.to_rgba_u8_srgb())
        .context("failed to create image from buffer")
}

/// Fit an image inside one grid cell, keeping its aspect ratio.
pub fn cell_thumbnail(buf: &ImageBuf) -> Result<RgbaImage> {
    let dynamic = DynamicImage::ImageRgba8(to_rgba_image(buf)?);
    let thumb = dynamic.resize(CELL_WIDTH, CELL_HEIGHT, FilterType::Lanczos3);
    Ok(thumb.into_rgba8())
}

/// File name for a cell: display position plus a filesystem-safe name.
pub fn cell_file_name(index: usize, name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{index:02}-{safe}.png")
}

/// Write every populated cell as a full-size PNG, in display order.
/// Empty cells are skipped but keep their index.
pub fn write_cells(dir: &Path, cells: &[FilterCell]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir: {}", dir.display()))?;

    let mut written = Vec::new();
    for (index, cell) in cells.iter().enumerate() {
        let Some(image) = &cell.image else {
            debug!(cell = %cell.name, "no output, skipping");
            continue;
        };
        let path = dir.join(cell_file_name(index, &cell.name));
        to_rgba_image(image)?
            .save(&path)
            .with_context(|| format!("write cell: {}", path.display()))?;
        debug!(?path, "wrote cell");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn cell(name: &str, buf: Option<ImageBuf>) -> FilterCell {
        FilterCell {
            name: name.to_string(),
            image: buf.map(Arc::new),
        }
    }

    #[test]
    fn thumbnail_fits_cell() {
        let buf = ImageBuf::from_data(600, 300, vec![0.5; 600 * 300 * 3]).unwrap();
        let thumb = cell_thumbnail(&buf).unwrap();
        assert_eq!(thumb.width(), CELL_WIDTH);
        assert_eq!(thumb.height(), 75);
    }

    #[test]
    fn small_image_scaled_up_to_cell() {
        let buf = ImageBuf::from_data(10, 20, vec![0.5; 600]).unwrap();
        let thumb = cell_thumbnail(&buf).unwrap();
        assert!(thumb.width() <= CELL_WIDTH && thumb.height() <= CELL_HEIGHT);
        assert_eq!(thumb.height(), CELL_HEIGHT);
    }

    #[test]
    fn file_names_are_safe_and_ordered() {
        assert_eq!(cell_file_name(0, "gaussian_blur"), "00-gaussian_blur.png");
        assert_eq!(cell_file_name(7, "Sepia 70%"), "07-sepia_70_.png");
    }

    #[test]
    fn writes_populated_cells_only() {
        let dir = tempfile::tempdir().unwrap();
        let cells = vec![
            cell("blur", Some(ImageBuf::from_data(4, 4, vec![0.2; 48]).unwrap())),
            cell("broken", None),
            cell("noir", Some(ImageBuf::from_data(4, 4, vec![0.7; 48]).unwrap())),
        ];
        let written = write_cells(dir.path(), &cells).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("00-blur.png"));
        assert!(written[1].ends_with("02-noir.png"));

        let reloaded = image::open(&written[1]).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (4, 4));
    }
}
