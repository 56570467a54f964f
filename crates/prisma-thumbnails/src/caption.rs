//! Cell captions drawn with a tiny built-in bitmap font.
//!
//! Glyphs are 3x5 bits, one row per entry, bit 2 is the left column. Letters
//! render as uppercase; characters without a glyph render as `?`.

use image::{Rgba, RgbaImage};

pub const GLYPH_WIDTH: u32 = 3;
pub const GLYPH_HEIGHT: u32 = 5;
/// Pixels per glyph bit.
pub const SCALE: u32 = 2;

const ADVANCE: u32 = (GLYPH_WIDTH + 1) * SCALE;
const ELLIPSIS: &str = "..";

fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        'A' => [0x2, 0x5, 0x7, 0x5, 0x5],
        'B' => [0x6, 0x5, 0x6, 0x5, 0x6],
        'C' => [0x3, 0x4, 0x4, 0x4, 0x3],
        'D' => [0x6, 0x5, 0x5, 0x5, 0x6],
        'E' => [0x7, 0x4, 0x6, 0x4, 0x7],
        'F' => [0x7, 0x4, 0x6, 0x4, 0x4],
        'G' => [0x3, 0x4, 0x5, 0x5, 0x3],
        'H' => [0x5, 0x5, 0x7, 0x5, 0x5],
        'I' => [0x7, 0x2, 0x2, 0x2, 0x7],
        'J' => [0x1, 0x1, 0x1, 0x5, 0x2],
        'K' => [0x5, 0x5, 0x6, 0x5, 0x5],
        'L' => [0x4, 0x4, 0x4, 0x4, 0x7],
        'M' => [0x5, 0x7, 0x7, 0x5, 0x5],
        'N' => [0x6, 0x5, 0x5, 0x5, 0x5],
        'O' => [0x2, 0x5, 0x5, 0x5, 0x2],
        'P' => [0x6, 0x5, 0x6, 0x4, 0x4],
        'Q' => [0x2, 0x5, 0x5, 0x6, 0x3],
        'R' => [0x6, 0x5, 0x6, 0x5, 0x5],
        'S' => [0x3, 0x4, 0x2, 0x1, 0x6],
        'T' => [0x7, 0x2, 0x2, 0x2, 0x2],
        'U' => [0x5, 0x5, 0x5, 0x5, 0x7],
        'V' => [0x5, 0x5, 0x5, 0x5, 0x2],
        'W' => [0x5, 0x5, 0x7, 0x7, 0x5],
        'X' => [0x5, 0x5, 0x2, 0x5, 0x5],
        'Y' => [0x5, 0x5, 0x2, 0x2, 0x2],
        'Z' => [0x7, 0x1, 0x2, 0x4, 0x7],
        '0' => [0x7, 0x5, 0x5, 0x5, 0x7],
        '1' => [0x2, 0x6, 0x2, 0x2, 0x7],
        '2' => [0x7, 0x1, 0x7, 0x4, 0x7],
        '3' => [0x7, 0x1, 0x7, 0x1, 0x7],
        '4' => [0x5, 0x5, 0x7, 0x1, 0x1],
        '5' => [0x7, 0x4, 0x7, 0x1, 0x7],
        '6' => [0x7, 0x4, 0x7, 0x5, 0x7],
        '7' => [0x7, 0x1, 0x2, 0x4, 0x4],
        '8' => [0x7, 0x5, 0x7, 0x5, 0x7],
        '9' => [0x7, 0x5, 0x7, 0x1, 0x7],
        ' ' => [0x0, 0x0, 0x0, 0x0, 0x0],
        '-' => [0x0, 0x0, 0x7, 0x0, 0x0],
        '_' => [0x0, 0x0, 0x0, 0x0, 0x7],
        '.' => [0x0, 0x0, 0x0, 0x0, 0x2],
        ',' => [0x0, 0x0, 0x0, 0x2, 0x4],
        ':' => [0x0, 0x2, 0x0, 0x2, 0x0],
        '%' => [0x5, 0x1, 0x2, 0x4, 0x5],
        '(' => [0x2, 0x4, 0x4, 0x4, 0x2],
        ')' => [0x2, 0x1, 0x1, 0x1, 0x2],
        '/' => [0x1, 0x1, 0x2, 0x4, 0x4],
        '\'' => [0x2, 0x2, 0x0, 0x0, 0x0],
        '+' => [0x0, 0x2, 0x7, 0x2, 0x0],
        '!' => [0x2, 0x2, 0x2, 0x0, 0x2],
        _ => [0x7, 0x1, 0x3, 0x0, 0x2],
    }
}

/// Rendered width of `text` in pixels.
pub fn text_width(text: &str) -> u32 {
    match text.chars().count() as u32 {
        0 => 0,
        n => n * ADVANCE - SCALE,
    }
}

/// Shorten `text` with a trailing `..` so it fits within `max_width` pixels.
pub fn fit(text: &str, max_width: u32) -> String {
    let max_chars = ((max_width + SCALE) / ADVANCE) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.extend(ELLIPSIS.chars().take(max_chars - keep));
    out
}

/// Draw `text` with its top-left corner at (`x`, `y`). Clipped to the image.
pub fn draw_text(image: &mut RgbaImage, x: u32, y: u32, text: &str, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    for (i, c) in text.chars().enumerate() {
        let cx = x + i as u32 * ADVANCE;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        let px = cx + col * SCALE + dx;
                        let py = y + row as u32 * SCALE + dy;
                        if px < width && py < height {
                            image.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const PAPER: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn lit(image: &RgbaImage) -> usize {
        image.pixels().filter(|p| **p == INK).count()
    }

    #[test]
    fn width_counts_gaps_between_glyphs() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("A"), GLYPH_WIDTH * SCALE);
        assert_eq!(text_width("AB"), 2 * GLYPH_WIDTH * SCALE + SCALE);
    }

    #[test]
    fn fit_keeps_short_text_and_truncates_long() {
        assert_eq!(fit("Noir", 150), "Noir");
        let long = "an extremely long filter label that will not fit";
        let fitted = fit(long, 150);
        assert!(fitted.ends_with(".."));
        assert!(text_width(&fitted) <= 150);
        assert!(text_width(&fit(long, 151)) <= 151);
        assert_eq!(fit("abc", 0), "");
    }

    #[test]
    fn draws_top_bar_of_t() {
        let mut image = RgbaImage::from_pixel(20, 20, PAPER);
        draw_text(&mut image, 2, 3, "t", INK);
        for x in 2..2 + GLYPH_WIDTH * SCALE {
            assert_eq!(*image.get_pixel(x, 3), INK, "x={x}");
        }
        // Stem only in the middle column below the bar.
        assert_eq!(*image.get_pixel(2, 3 + SCALE), PAPER);
        assert_eq!(*image.get_pixel(2 + SCALE, 3 + SCALE), INK);
    }

    #[test]
    fn space_draws_nothing_and_unknown_draws_something() {
        let mut image = RgbaImage::from_pixel(20, 20, PAPER);
        draw_text(&mut image, 0, 0, "  ", INK);
        assert_eq!(lit(&image), 0);
        draw_text(&mut image, 0, 0, "é", INK);
        assert!(lit(&image) > 0);
    }

    #[test]
    fn clips_at_image_edges() {
        let mut image = RgbaImage::from_pixel(5, 4, PAPER);
        draw_text(&mut image, 3, 2, "WWW", INK);
        assert!(lit(&image) > 0);
    }
}
