use std::sync::LazyLock;

use crate::color::srgb_to_linear;

/// Linear f32 RGB image buffer.
///
/// All pixel data is stored as interleaved RGBRGBRGB... in linear light.
/// Filters may push values above 1.0; conversion to u8 clamps.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuf {
    pub width: u32,
    pub height: u32,
    /// Flat pixel data: [R, G, B, R, G, B, ...] in linear f32.
    pub data: Vec<f32>,
}

impl ImageBuf {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height * 3) as usize],
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> anyhow::Result<Self> {
        let expected = (width * height * 3) as usize;
        anyhow::ensure!(
            data.len() == expected,
            "expected {expected} floats for {width}x{height} RGB, got {}",
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a buffer from 8-bit sRGB RGB bytes.
    pub fn from_rgb_u8_srgb(width: u32, height: u32, bytes: &[u8]) -> anyhow::Result<Self> {
        let lut = &*SRGB_U8_TO_LINEAR;
        let data = bytes.iter().map(|&b| lut[b as usize]).collect();
        Self::from_data(width, height, data)
    }

    /// Same buffer with every pixel produced by `f`.
    pub fn map_pixels(&self, f: impl Fn([f32; 3]) -> [f32; 3]) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for pixel in self.data.chunks_exact(3) {
            data.extend_from_slice(&f([pixel[0], pixel[1], pixel[2]]));
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Convert to RGBA u8 with sRGB gamma for display/thumbnail use.
    pub fn to_rgba_u8_srgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixel_count() * 4);
        for pixel in self.data.chunks_exact(3) {
            out.push(linear_to_srgb_u8(pixel[0]));
            out.push(linear_to_srgb_u8(pixel[1]));
            out.push(linear_to_srgb_u8(pixel[2]));
            out.push(255);
        }
        out
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn same_dimensions(&self, other: &ImageBuf) -> bool {
        self.width == other.width && self.height == other.height
    }
}

const SRGB_LUT_SIZE: usize = 4096;

static SRGB_LUT: LazyLock<[u8; SRGB_LUT_SIZE]> = LazyLock::new(|| {
    let mut lut = [0u8; SRGB_LUT_SIZE];
    for (i, entry) in lut.iter_mut().enumerate() {
        let v = i as f32 / (SRGB_LUT_SIZE - 1) as f32;
        *entry = (crate::color::linear_to_srgb(v) * 255.0 + 0.5) as u8;
    }
    lut
});

/// 256-entry LUT for u8 sRGB -> linear f32.
static SRGB_U8_TO_LINEAR: LazyLock<[f32; 256]> = LazyLock::new(|| {
    let mut lut = [0.0f32; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        *entry = srgb_to_linear(i as f32 / 255.0);
    }
    lut
});

fn linear_to_srgb_u8(v: f32) -> u8 {
    let v = v.clamp(0.0, 1.0);
    let idx = (v * (SRGB_LUT_SIZE - 1) as f32) as usize;
    SRGB_LUT[idx]
}
