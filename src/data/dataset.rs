use burn::data::dataset::Dataset;

use crate::data::transforms::ImageTransform;
use crate::domain::image::{RawImage, CHANNELS};

/// One preprocessed training image.
/// `pixels` is planar [3, size, size], normalised to [-1, 1].
#[derive(Debug, Clone)]
pub struct ImageSample {
    pub pixels: Vec<f32>,
    pub size:   usize,
}

impl ImageSample {
    pub fn shape(&self) -> [usize; 3] {
        [CHANNELS, self.size, self.size]
    }
}

/// Keeps the decoded bytes and runs the transform pipeline on
/// every `get`, so only the batch being assembled is held as f32.
pub struct ImageDataset {
    images:    Vec<RawImage>,
    transform: ImageTransform,
}

impl ImageDataset {
    pub fn new(images: Vec<RawImage>, transform: ImageTransform) -> Self {
        Self { images, transform }
    }

    pub fn sample_count(&self) -> usize { self.images.len() }

    /// Side length of the samples this dataset yields
    pub fn sample_size(&self) -> usize { self.transform.size }
}

impl Dataset<ImageSample> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.images.get(index).map(|img| ImageSample {
            pixels: self.transform.apply(img),
            size:   self.transform.size,
        })
    }

    fn len(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_applies_transform() {
        let raw = vec![
            RawImage::new(2, 2, vec![0; 12], Some(1)).unwrap(),
            RawImage::new(2, 2, vec![255; 12], Some(2)).unwrap(),
        ];
        let ds = ImageDataset::new(raw, ImageTransform::new(4));

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.sample_size(), 4);

        let s = ds.get(1).unwrap();
        assert_eq!(s.shape(), [3, 4, 4]);
        assert_eq!(s.pixels.len(), 48);
        assert!(s.pixels.iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let s = ds.get(0).unwrap();
        assert!(s.pixels.iter().all(|&v| (v + 1.0).abs() < 1e-6));
        assert!(ds.get(2).is_none());
    }
}
