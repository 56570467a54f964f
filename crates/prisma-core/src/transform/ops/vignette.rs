use anyhow::Result;

use crate::color::smoothstep;
use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

/// Radial darkening toward the corners.
///
/// `radius` is the fraction of the half diagonal over which the falloff
/// ramps from none to full; `intensity` 1.0 halves the corners, 2.0 blacks
/// them out.
pub struct Vignette {
    intensity: f32,
    radius: f32,
}

impl Vignette {
    pub fn new(intensity: f32, radius: f32) -> Self {
        Self { intensity, radius }
    }
}

impl TransformOp for Vignette {
    fn name(&self) -> &str {
        "vignette"
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        let w = input.width as usize;
        let cx = (input.width as f32 - 1.0) / 2.0;
        let cy = (input.height as f32 - 1.0) / 2.0;
        let half_diag = (cx * cx + cy * cy).sqrt();

        let mut out = input.clone();
        for (i, pixel) in out.data.chunks_exact_mut(3).enumerate() {
            let x = (i % w) as f32;
            let y = (i / w) as f32;
            let d = if half_diag > 0.0 {
                ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / half_diag
            } else {
                0.0
            };
            let falloff = smoothstep(0.0, self.radius, d);
            let factor = (1.0 - 0.5 * self.intensity * falloff).max(0.0);
            for c in pixel {
                *c *= factor;
            }
        }
        Ok(out)
    }
}
