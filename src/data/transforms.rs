// ============================================================
// Layer 4: Image Transforms
// ============================================================
// Turns a RawImage into the normalised float sample the
// networks train on. Applied in order:
//
//   1. Resize      shorter edge → `size`, keeping aspect ratio
//                  (bilinear, half-pixel centres)
//   2. CenterCrop  `size` x `size`
//   3. Normalize   byte v → (v / 255 - 0.5) / 0.5, i.e. [-1, 1]
//
// The generator ends in tanh, so real images must live in the
// same [-1, 1] range as generated ones.

use crate::domain::image::{RawImage, CHANNELS};

/// Per-channel mean and std used by Normalize
pub const NORM_MEAN: f32 = 0.5;
pub const NORM_STD:  f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct ImageTransform {
    /// Output side length
    pub size: usize,
}

impl ImageTransform {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// Run the full pipeline: resize, crop, normalise.
    /// Returns `CHANNELS * size * size` floats in planar layout.
    pub fn apply(&self, image: &RawImage) -> Vec<f32> {
        let resized = self.resize(image);
        let cropped = self.center_crop(&resized);
        normalize(&cropped.pixels)
    }

    /// Scale so the shorter edge equals `size`.
    pub fn resize(&self, image: &RawImage) -> RawImage {
        let (w, h) = (image.width, image.height);
        let (new_w, new_h) = if w <= h {
            (self.size, self.size * h / w)
        } else {
            (self.size * w / h, self.size)
        };

        if new_w == w && new_h == h {
            return image.clone();
        }
        resize_bilinear(image, new_w, new_h)
    }

    /// Cut the central `size` x `size` window.
    /// Images are always resized first, so both sides are >= size.
    pub fn center_crop(&self, image: &RawImage) -> RawImage {
        if image.width == self.size && image.height == self.size {
            return image.clone();
        }

        let left = crop_offset(image.width  - self.size);
        let top  = crop_offset(image.height - self.size);

        let mut pixels = Vec::with_capacity(CHANNELS * self.size * self.size);
        for c in 0..CHANNELS {
            for y in top..top + self.size {
                for x in left..left + self.size {
                    pixels.push(image.at(c, x, y));
                }
            }
        }

        RawImage {
            width:  self.size,
            height: self.size,
            pixels,
            label:  image.label,
        }
    }
}

/// Leading margin of a centred crop: half the excess, with
/// halves rounded to the nearest even integer (1.5 → 2, 2.5 → 2).
fn crop_offset(excess: usize) -> usize {
    (excess as f64 / 2.0).round_ties_even() as usize
}

/// Bilinear resize of a planar RGB image.
pub fn resize_bilinear(image: &RawImage, new_w: usize, new_h: usize) -> RawImage {
    let scale_x = image.width  as f32 / new_w as f32;
    let scale_y = image.height as f32 / new_h as f32;

    // Precompute (lower index, upper index, weight of upper) per axis
    let axis = |dst: usize, scale: f32, len: usize| -> (usize, usize, f32) {
        let src = ((dst as f32 + 0.5) * scale - 0.5).max(0.0);
        let i0  = (src.floor() as usize).min(len - 1);
        let i1  = (i0 + 1).min(len - 1);
        (i0, i1, src - i0 as f32)
    };
    let xs: Vec<_> = (0..new_w).map(|x| axis(x, scale_x, image.width)).collect();
    let ys: Vec<_> = (0..new_h).map(|y| axis(y, scale_y, image.height)).collect();

    let mut pixels = Vec::with_capacity(CHANNELS * new_w * new_h);
    for c in 0..CHANNELS {
        for &(y0, y1, fy) in &ys {
            for &(x0, x1, fx) in &xs {
                let top    = lerp(image.at(c, x0, y0), image.at(c, x1, y0), fx);
                let bottom = lerp(image.at(c, x0, y1), image.at(c, x1, y1), fx);
                let v      = top + (bottom - top) * fy;
                pixels.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    RawImage {
        width:  new_w,
        height: new_h,
        pixels,
        label:  image.label,
    }
}

fn lerp(a: u8, b: u8, t: f32) -> f32 {
    a as f32 + (b as f32 - a as f32) * t
}

/// ToTensor + Normalize: bytes → floats in [-1, 1]
pub fn normalize(pixels: &[u8]) -> Vec<f32> {
    pixels
        .iter()
        .map(|&v| (v as f32 / 255.0 - NORM_MEAN) / NORM_STD)
        .collect()
}
