// ============================================================
// Layer 2: Sample Use Case
// ============================================================
// Restores the generator from a training run's checkpoints and
// writes a grid of freshly generated images:
//
//   1. Read train_config.json to rebuild the generator
//   2. Load weights for the requested (or latest) epoch
//   3. Generate `count` images from new noise
//   4. Save them as one PNG grid

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::infra::{checkpoint::CheckpointManager, image_writer::save_image};
use crate::ml::sampler::Sampler;

pub struct SampleUseCase {
    output_dir: String,
    sampler:    Sampler<burn::backend::Wgpu>,
}

impl SampleUseCase {
    pub fn new(output_dir: String, epoch: Option<usize>) -> Result<Self> {
        let ckpt    = CheckpointManager::new(&output_dir);
        let sampler = Sampler::from_checkpoint(&ckpt, epoch)?;
        Ok(Self { output_dir, sampler })
    }

    /// Generate and save. `out` defaults to
    /// `<output_dir>/generated_samples.png`.
    pub fn generate(&self, count: usize, out: Option<&Path>) -> Result<PathBuf> {
        let path = match out {
            Some(p) => p.to_path_buf(),
            None => Path::new(&self.output_dir).join("generated_samples.png"),
        };

        let batch = self.sampler.generate(count)?;
        save_image(&batch.values, batch.dims, &path)?;

        tracing::info!("Wrote {} generated images to '{}'", count, path.display());
        Ok(path)
    }
}
