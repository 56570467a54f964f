use anyhow::{Result, ensure};
use image::{Rgba, RgbaImage, imageops};
use tracing::debug;

use prisma_core::pipeline::FilterCell;

use crate::caption::{self, GLYPH_HEIGHT, SCALE};
use crate::generator::{CELL_HEIGHT, CELL_WIDTH, cell_thumbnail};

pub const SPACING: u32 = 10;

const CAPTION_PADDING: u32 = 4;
/// Strip under each cell holding its name.
pub const CAPTION_HEIGHT: u32 = GLYPH_HEIGHT * SCALE + 2 * CAPTION_PADDING;

const BACKGROUND: Rgba<u8> = Rgba([24, 24, 24, 255]);
const PLACEHOLDER: Rgba<u8> = Rgba([48, 48, 48, 255]);
const CAPTION: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// Lay the cells out row by row in display order.
///
/// Each thumbnail is centered in its cell with the cell's name underneath;
/// cells without an image are filled with a placeholder.
pub fn contact_sheet(cells: &[FilterCell], columns: u32) -> Result<RgbaImage> {
    ensure!(columns > 0, "contact sheet needs at least one column");
    ensure!(!cells.is_empty(), "contact sheet needs at least one cell");

    let count = cells.len() as u32;
    let cols = columns.min(count);
    let rows = count.div_ceil(cols);
    let width = cols * CELL_WIDTH + (cols + 1) * SPACING;
    let slot_height = CELL_HEIGHT + CAPTION_HEIGHT;
    let height = rows * slot_height + (rows + 1) * SPACING;

    let mut sheet = RgbaImage::from_pixel(width, height, BACKGROUND);

    for (index, cell) in cells.iter().enumerate() {
        let index = index as u32;
        let x0 = SPACING + (index % cols) * (CELL_WIDTH + SPACING);
        let y0 = SPACING + (index / cols) * (slot_height + SPACING);

        match &cell.image {
            Some(image) => {
                let thumb = cell_thumbnail(image)?;
                let x = x0 + (CELL_WIDTH - thumb.width()) / 2;
                let y = y0 + (CELL_HEIGHT - thumb.height()) / 2;
                imageops::overlay(&mut sheet, &thumb, x as i64, y as i64);
            }
            None => {
                let filler = RgbaImage::from_pixel(CELL_WIDTH, CELL_HEIGHT, PLACEHOLDER);
                imageops::overlay(&mut sheet, &filler, x0 as i64, y0 as i64);
            }
        }

        let label = caption::fit(&cell.name, CELL_WIDTH);
        let x = x0 + (CELL_WIDTH - caption::text_width(&label)) / 2;
        caption::draw_text(&mut sheet, x, y0 + CELL_HEIGHT + CAPTION_PADDING, &label, CAPTION);
    }

    debug!(cells = count, cols, rows, width, height, "composed contact sheet");
    Ok(sheet)
}
