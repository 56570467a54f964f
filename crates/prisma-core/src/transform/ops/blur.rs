use anyhow::Result;
use rayon::prelude::*;

use crate::image_buf::ImageBuf;
use crate::transform::op::TransformOp;

/// Separable Gaussian blur. `radius` is the standard deviation in pixels.
pub struct GaussianBlur {
    radius: f32,
}

impl GaussianBlur {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl TransformOp for GaussianBlur {
    fn name(&self) -> &str {
        "gaussian_blur"
    }

    fn apply(&self, input: &ImageBuf) -> Result<ImageBuf> {
        Ok(gaussian_blur(input, self.radius))
    }
}

/// Normalized 1D Gaussian kernel covering +/- 3 sigma.
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let half = (sigma * 3.0).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|x| (-(x * x) as f32 / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Blur with edges clamped, so the output keeps the input's extent.
pub fn gaussian_blur(input: &ImageBuf, sigma: f32) -> ImageBuf {
    if sigma <= 0.0 || input.is_empty() {
        return input.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let half = (kernel.len() / 2) as isize;
    let w = input.width as usize;
    let h = input.height as usize;
    let stride = w * 3;

    let mut horizontal = vec![0.0_f32; input.data.len()];
    horizontal
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let src = &input.data[y * stride..(y + 1) * stride];
            for x in 0..w {
                let mut acc = [0.0_f32; 3];
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                    for c in 0..3 {
                        acc[c] += weight * src[sx * 3 + c];
                    }
                }
                row[x * 3..x * 3 + 3].copy_from_slice(&acc);
            }
        });

    let mut data = vec![0.0_f32; input.data.len()];
    data.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let mut acc = [0.0_f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
                let idx = sy * stride + x * 3;
                for c in 0..3 {
                    acc[c] += weight * horizontal[idx + c];
                }
            }
            row[x * 3..x * 3 + 3].copy_from_slice(&acc);
        }
    });

    ImageBuf {
        width: input.width,
        height: input.height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(2.0);
        assert_eq!(kernel.len(), 13);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn zero_radius_is_identity() {
        let buf = ImageBuf::from_data(3, 3, (0..27).map(|i| i as f32 / 27.0).collect()).unwrap();
        let out = GaussianBlur::new(0.0).apply(&buf).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn flat_image_stays_flat() {
        let buf = ImageBuf::from_data(10, 7, vec![0.3; 210]).unwrap();
        let out = GaussianBlur::new(4.0).apply(&buf).unwrap();
        assert!(out.same_dimensions(&buf));
        for &v in &out.data {
            assert!((v - 0.3).abs() < 1e-5);
        }
    }

    #[test]
    fn spreads_a_single_bright_pixel() {
        let mut buf = ImageBuf::new(9, 9);
        let center = (4 * 9 + 4) * 3;
        buf.data[center..center + 3].copy_from_slice(&[1.0, 1.0, 1.0]);
        let out = gaussian_blur(&buf, 1.5);
        assert!(out.data[center] < 1.0);
        assert!(out.data[center] > out.data[(4 * 9 + 5) * 3]);
        assert!(out.data[(4 * 9 + 5) * 3] > 0.0);
    }

    #[test]
    fn radius_larger_than_image_does_not_panic() {
        let buf = ImageBuf::from_data(2, 1, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let out = gaussian_blur(&buf, 50.0);
        assert_eq!(out.data.len(), 6);
        assert!(out.data.iter().all(|v| v.is_finite()));
    }
}
