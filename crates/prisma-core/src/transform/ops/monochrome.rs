use anyhow::Result;

use crate::color::{lerp, luminance, srgb_to_linear};
use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

/// Replace hue with a single tint color, keeping luminance.
pub struct Monochrome {
    /// Tint in linear RGB.
    color: [f32; 3],
    intensity: f32,
}

impl Monochrome {
    /// Warm brown tint, given in display values.
    pub const DEFAULT_COLOR: [f32; 3] = [0.6, 0.45, 0.3];

    /// `color` is in display (sRGB) values.
    pub fn new(color: [f32; 3], intensity: f32) -> Self {
        Self {
            color: color.map(srgb_to_linear),
            intensity,
        }
    }
}

impl TransformOp for Monochrome {
    fn name(&self) -> &str {
        "monochrome"
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        let tint_y = luminance(self.color).max(1e-6);
        let scale = self.color.map(|c| c / tint_y);
        let t = self.intensity;
        Ok(input.map_pixels(|p| {
            let y = luminance(p);
            [
                lerp(p[0], y * scale[0], t).max(0.0),
                lerp(p[1], y * scale[1], t).max(0.0),
                lerp(p[2], y * scale[2], t).max(0.0),
            ]
        }))
    }
}
