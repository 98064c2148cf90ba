// ============================================================
// Layer 4: Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<ImageSample>
// into one image tensor.
//
//   Input:  N samples, each [3, S, S] floats
//   Output: ImageBatch with images of shape [N, 3, S, S]
//
// All samples already share the same size (the transform
// crops to a square), so stacking is a plain concatenation
// of the flat buffers followed by a reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::ImageSample;
use crate::domain::image::CHANNELS;

// ─── ImageBatch ───────────────────────────────────────────────────────────────
/// A batch of real images ready for the critic.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, 3, size, size], values in [-1, 1]
    pub images: Tensor<B, 4>,
}

impl<B: Backend> ImageBatch<B> {
    /// Number of images in this batch (the last batch of an
    /// epoch may be smaller than the configured batch size)
    pub fn count(&self) -> usize {
        self.images.dims()[0]
    }
}

// ─── ImageBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug, Default)]
pub struct ImageBatcher;

impl ImageBatcher {
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Batcher<B, ImageSample, ImageBatch<B>> for ImageBatcher {
    fn batch(&self, items: Vec<ImageSample>, device: &B::Device) -> ImageBatch<B> {
        let batch_size = items.len();
        let size       = items[0].size;

        let flat: Vec<f32> = items
            .into_iter()
            .flat_map(|s| s.pixels)
            .collect();

        let data   = TensorData::new(flat, [batch_size, CHANNELS, size, size]);
        let images = Tensor::<B, 4>::from_data(data, device);

        ImageBatch { images }
    }
}
