// ============================================================
// Layer 5: Sampler
// ============================================================
// Turns a trained generator back into pictures.
//
// Two callers:
//   - the training loop, after every epoch, with the fixed noise
//   - the `sample` command, with a generator restored from a
//     checkpoint on the inference backend (no autodiff, batch
//     norm running statistics)

use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{sample_noise, Generator, GeneratorConfig};

type InferBackend = burn::backend::Wgpu;

/// Generated images as a flat planar buffer plus its shape
pub struct SampleBatch {
    pub values: Vec<f32>,
    pub dims:   [usize; 4],
}

/// Map tanh output [-1, 1] to [0, 1] and copy it off the device.
pub fn to_sample_batch<B: Backend>(images: Tensor<B, 4>) -> Result<SampleBatch> {
    let images = images.mul_scalar(0.5).add_scalar(0.5);
    let dims   = images.dims();
    let values = images
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read generated images: {e:?}"))?;
    Ok(SampleBatch { values, dims })
}

pub struct Sampler<B: Backend> {
    generator: Generator<B>,
    noise_dim: usize,
    device:    B::Device,
}

impl Sampler<InferBackend> {
    /// Rebuild the generator from the saved config and load its
    /// weights from `epoch` (latest when None).
    pub fn from_checkpoint(ckpt: &CheckpointManager, epoch: Option<usize>) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt.load_config()?;

        let generator = GeneratorConfig::new()
            .with_noise_dim(cfg.noise_dim)
            .init::<InferBackend>(&device);
        let generator = ckpt.load_generator(generator, epoch, &device)?;
        tracing::info!("Generator loaded from checkpoint");

        Ok(Self::new(generator, cfg.noise_dim, device))
    }
}

impl<B: Backend> Sampler<B> {
    pub fn new(generator: Generator<B>, noise_dim: usize, device: B::Device) -> Self {
        Self { generator, noise_dim, device }
    }

    /// Generate `count` images from fresh noise.
    pub fn generate(&self, count: usize) -> Result<SampleBatch> {
        let noise = sample_noise::<B>(count, self.noise_dim, &self.device);
        to_sample_batch(self.generator.forward(noise))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_sample_batch_is_in_unit_range() {
        let device    = Default::default();
        let generator = GeneratorConfig::new().with_noise_dim(8).init::<TestBackend>(&device);
        let sampler   = Sampler::new(generator, 8, device);

        let batch = sampler.generate(2).unwrap();
        assert_eq!(batch.dims, [2, 3, 64, 64]);
        assert_eq!(batch.values.len(), 2 * 3 * 64 * 64);
        assert!(batch.values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_to_sample_batch_rescales() {
        let device = Default::default();
        let images = Tensor::<TestBackend, 4>::from_floats([[[[-1.0, 0.0, 1.0]]]], &device);
        let batch  = to_sample_batch(images).unwrap();
        assert_eq!(batch.values, vec![0.0, 0.5, 1.0]);
        assert_eq!(batch.dims, [1, 1, 1, 3]);
    }
}
