use anyhow::Result;

use crate::color::{apply_matrix, in_display_space, lerp};
use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Classic sepia matrix on display values, blended with the original by `intensity`.
pub struct SepiaTone {
    intensity: f32,
}

impl SepiaTone {
    pub fn new(intensity: f32) -> Self {
        Self { intensity }
    }
}

impl TransformOp for SepiaTone {
    fn name(&self) -> &str {
        "sepia"
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        let t = self.intensity;
        Ok(input.map_pixels(|px| {
            in_display_space(px, |p| {
                let toned = apply_matrix(&SEPIA, p);
                [
                    lerp(p[0], toned[0], t),
                    lerp(p[1], toned[1], t),
                    lerp(p[2], toned[2], t),
                ]
            })
        }))
    }
}
