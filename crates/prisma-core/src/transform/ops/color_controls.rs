use anyhow::Result;

use crate::color::luminance;
use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

/// Saturation around each pixel's luminance, in linear light.
pub struct ColorControls {
    saturation: f32,
}

impl ColorControls {
    pub fn with_saturation(saturation: f32) -> Self {
        Self { saturation }
    }
}

impl TransformOp for ColorControls {
    fn name(&self) -> &str {
        "color_controls"
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        Ok(input.map_pixels(|p| {
            let y = luminance(p);
            p.map(|c| (y + self.saturation * (c - y)).max(0.0))
        }))
    }
}
