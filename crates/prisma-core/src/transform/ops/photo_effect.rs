use anyhow::Result;

use crate::color::{apply_matrix, in_display_space, lerp, luminance};
use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhotoStyle {
    /// High-contrast black and white.
    Noir,
    /// Warm, faded print.
    Instant,
    /// Vintage warm cast with lifted shadows.
    Transfer,
}

const INSTANT: [[f32; 3]; 3] = [
    [1.05, 0.05, -0.05],
    [0.0, 1.0, 0.02],
    [-0.05, 0.05, 0.9],
];

const TRANSFER: [[f32; 3]; 3] = [
    [1.1, 0.05, -0.1],
    [0.05, 1.0, -0.05],
    [-0.1, 0.1, 0.85],
];

/// Preset "film" looks: a color matrix plus a tone curve, on display values.
pub struct PhotoEffect {
    style: PhotoStyle,
    intensity: f32,
}

impl PhotoEffect {
    pub fn new(style: PhotoStyle, intensity: f32) -> Self {
        Self { style, intensity }
    }

    fn look(&self, p: [f32; 3]) -> [f32; 3] {
        match self.style {
            PhotoStyle::Noir => {
                let y = luminance(p);
                let v = ((y - 0.5) * 1.35 + 0.5).clamp(0.0, 1.0);
                [v, v, v]
            }
            PhotoStyle::Instant => {
                apply_matrix(&INSTANT, p).map(|c| 0.08 + c.clamp(0.0, 1.0) * 0.88)
            }
            PhotoStyle::Transfer => {
                apply_matrix(&TRANSFER, p).map(|c| 0.04 + c.clamp(0.0, 1.0) * 0.94)
            }
        }
    }
}

impl TransformOp for PhotoEffect {
    fn name(&self) -> &str {
        match self.style {
            PhotoStyle::Noir => "noir",
            PhotoStyle::Instant => "instant",
            PhotoStyle::Transfer => "transfer",
        }
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        let t = self.intensity;
        Ok(input.map_pixels(|px| {
            in_display_space(px, |p| {
                let looked = self.look(p);
                [
                    lerp(p[0], looked[0], t),
                    lerp(p[1], looked[1], t),
                    lerp(p[2], looked[2], t),
                ]
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colorful() -> ImageBuf {
        ImageBuf::from_data(2, 1, vec![0.8, 0.3, 0.1, 0.05, 0.4, 0.6]).unwrap()
    }

    #[test]
    fn noir_is_gray() {
        let out = PhotoEffect::new(PhotoStyle::Noir, 1.0).apply(&colorful()).unwrap();
        for px in out.data.chunks_exact(3) {
            assert!((px[0] - px[1]).abs() < 1e-6 && (px[1] - px[2]).abs() < 1e-6);
        }
    }

    #[test]
    fn instant_lifts_black() {
        let black = ImageBuf::new(1, 1);
        let out = PhotoEffect::new(PhotoStyle::Instant, 1.0).apply(&black).unwrap();
        assert!(out.data.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn transfer_warms_neutral_gray() {
        let gray = ImageBuf::from_data(1, 1, vec![0.2, 0.2, 0.2]).unwrap();
        let out = PhotoEffect::new(PhotoStyle::Transfer, 1.0).apply(&gray).unwrap();
        assert!(out.data[0] > out.data[2]);
    }

    #[test]
    fn zero_intensity_keeps_colors() {
        let src = colorful();
        let out = PhotoEffect::new(PhotoStyle::Noir, 0.0).apply(&src).unwrap();
        for (a, b) in out.data.iter().zip(&src.data) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn names_follow_style() {
        assert_eq!(PhotoEffect::new(PhotoStyle::Transfer, 1.0).name(), "transfer");
    }
}
