use anyhow::Result;

use super::blur::gaussian_blur;
use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

/// Sharpen by adding back the difference from a blurred copy.
pub struct UnsharpMask {
    radius: f32,
    intensity: f32,
}

impl UnsharpMask {
    pub fn new(radius: f32, intensity: f32) -> Self {
        Self { radius, intensity }
    }
}

impl TransformOp for UnsharpMask {
    fn name(&self) -> &str {
        "unsharp_mask"
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        let blurred = gaussian_blur(input, self.radius);
        let data = input
            .data
            .iter()
            .zip(&blurred.data)
            .map(|(&x, &b)| (x + self.intensity * (x - b)).max(0.0))
            .collect();
        ImageBuf::from_data(input.width, input.height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_unchanged() {
        let buf = ImageBuf::from_data(5, 5, vec![0.4; 75]).unwrap();
        let out = UnsharpMask::new(2.5, 0.5).apply(&buf).unwrap();
        for &v in &out.data {
            assert!((v - 0.4).abs() < 1e-5);
        }
    }

    #[test]
    fn edge_contrast_increases() {
        // Left half dark, right half bright.
        let mut data = Vec::new();
        for _y in 0..4 {
            for x in 0..8 {
                let v = if x < 4 { 0.2 } else { 0.8 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        let buf = ImageBuf::from_data(8, 4, data).unwrap();
        let out = UnsharpMask::new(1.0, 1.0).apply(&buf).unwrap();
        let dark_edge = out.data[3 * 3];
        let bright_edge = out.data[4 * 3];
        assert!(dark_edge < 0.2);
        assert!(bright_edge > 0.8);
    }

    #[test]
    fn never_negative() {
        let buf = ImageBuf::from_data(3, 1, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0])
            .unwrap();
        let out = UnsharpMask::new(1.0, 10.0).apply(&buf).unwrap();
        assert!(out.data.iter().all(|&v| v >= 0.0));
    }
}
