// ============================================================
// Layer 3: RawImage Domain Type
// ============================================================
// A single decoded image as it comes off disk, before any
// resizing or normalisation.
//
// Pixels are stored PLANAR (channel-major), the same layout
// CIFAR-10 uses on disk and the layout Burn expects for
// [channels, height, width] tensors:
//
//   [R R R ... R | G G G ... G | B B B ... B]
//    └ h*w ────┘   └ h*w ────┘   └ h*w ────┘
//
// Reference: Rust Book §5 (Structs and Methods)

use anyhow::{bail, Result};

/// Number of colour channels every image is converted to.
pub const CHANNELS: usize = 3;

/// An 8-bit RGB image in planar layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub width:  usize,
    pub height: usize,

    /// `CHANNELS * height * width` bytes, one plane per channel
    pub pixels: Vec<u8>,

    /// Class label if the source provides one (CIFAR-10 does).
    /// The GAN never looks at it; kept for traceability.
    pub label: Option<u8>,
}

impl RawImage {
    /// Create a new image, checking that the pixel buffer
    /// matches the declared dimensions.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>, label: Option<u8>) -> Result<Self> {
        let expected = CHANNELS * width * height;
        if pixels.len() != expected {
            bail!(
                "Image buffer has {} bytes, expected {} for {}x{} RGB",
                pixels.len(), expected, width, height
            );
        }
        Ok(Self { width, height, pixels, label })
    }

    /// Build a planar image from interleaved samples (RGBRGB..., or
    /// Gray / GrayAlpha / RGBA). `samples_per_pixel` selects the layout.
    pub fn from_interleaved(
        width:  usize,
        height: usize,
        data:   &[u8],
        samples_per_pixel: usize,
    ) -> Result<Self> {
        if samples_per_pixel == 0 || samples_per_pixel > 4 {
            bail!("Unsupported sample count per pixel: {samples_per_pixel}");
        }
        if data.len() < width * height * samples_per_pixel {
            bail!("Interleaved buffer too short for {}x{} image", width, height);
        }

        let plane  = width * height;
        let mut pixels = vec![0u8; CHANNELS * plane];
        for i in 0..plane {
            let px = &data[i * samples_per_pixel..(i + 1) * samples_per_pixel];
            let (r, g, b) = match samples_per_pixel {
                // Gray and GrayAlpha: replicate the luminance
                1 | 2 => (px[0], px[0], px[0]),
                // RGB and RGBA: alpha is dropped
                _ => (px[0], px[1], px[2]),
            };
            pixels[i]             = r;
            pixels[plane + i]     = g;
            pixels[2 * plane + i] = b;
        }

        Self::new(width, height, pixels, None)
    }

    /// Byte value of channel `c` at column `x`, row `y`.
    pub fn at(&self, c: usize, x: usize, y: usize) -> u8 {
        self.pixels[c * self.width * self.height + y * self.width + x]
    }
}
