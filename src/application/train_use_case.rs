// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the config
//   Step 2: Load raw images            (Layer 4 - data)
//   Step 3: Wrap in a lazily transformed dataset (Layer 4 - data)
//   Step 4: Resolve the shuffle seed
//   Step 5: Save config                (Layer 6 - infra)
//   Step 6: Run the WGAN loop          (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{
    cifar::Cifar10Loader,
    dataset::ImageDataset,
    folder::ImageFolderLoader,
    transforms::ImageTransform,
};
use crate::domain::traits::ImageSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::StepMetrics};
use crate::ml::trainer::run_training;

/// Side length the networks are built for
pub const IMAGE_SIZE: usize = 64;

/// Where training images come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// CIFAR-10 binary batches under <data_dir>/cifar-10-batches-bin
    Cifar10,
    /// Every .png file directly inside <data_dir>
    Folder,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoints so `sample` can rebuild the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:     String,
    pub dataset:      DatasetKind,
    pub output_dir:   String,
    pub batch_size:   usize,
    pub sample_count: usize,
    pub epochs:       usize,
    pub lr:           f64,
    pub critic_iter:  usize,
    pub noise_dim:    usize,
    pub clip_value:   f32,
    pub num_workers:  usize,
    pub seed:         Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:     "./data".to_string(),
            dataset:      DatasetKind::Cifar10,
            output_dir:   "./WGANOutput".to_string(),
            batch_size:   128,
            sample_count: 64,
            epochs:       10,
            lr:           2e-4,
            critic_iter:  5,
            noise_dim:    100,
            clip_value:   0.01,
            num_workers:  2,
            seed:         None,
        }
    }
}

impl TrainConfig {
    /// Reject settings the training loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.sample_count == 0 {
            bail!("sample_count must be at least 1");
        }
        if self.critic_iter == 0 {
            bail!("critic_iter must be at least 1");
        }
        if self.noise_dim == 0 {
            bail!("noise_dim must be at least 1");
        }
        if !(self.clip_value > 0.0) {
            bail!("clip_value must be positive, got {}", self.clip_value);
        }
        if !(self.lr > 0.0) {
            bail!("lr must be positive, got {}", self.lr);
        }
        Ok(())
    }

    /// The image source selected by `dataset`
    pub fn image_source(&self) -> Box<dyn ImageSource> {
        match self.dataset {
            DatasetKind::Cifar10 => Box::new(Cifar10Loader::new(&self.data_dir)),
            DatasetKind::Folder  => Box::new(ImageFolderLoader::new(&self.data_dir)),
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    /// Returns the per-step loss history.
    pub fn execute(&self) -> Result<Vec<StepMetrics>> {
        let mut cfg = self.config.clone();

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load images ───────────────────────────────────────────────
        let source = cfg.image_source();
        tracing::info!("Loading images from {}", source.describe());
        let raw_images = source.load_all()?;
        tracing::info!("Loaded {} images", raw_images.len());

        // ── Step 3: Preprocess ────────────────────────────────────────────────
        // Applied lazily, per item, as the data loader asks for it
        let dataset = ImageDataset::new(raw_images, ImageTransform::new(IMAGE_SIZE));
        tracing::info!(
            "Dataset of {} images, served at {}x{}",
            dataset.sample_count(), dataset.sample_size(), dataset.sample_size()
        );

        // ── Step 4: Shuffle seed ──────────────────────────────────────────────
        // Recorded in the saved config so a run can be repeated
        let seed = *cfg.seed.get_or_insert_with(|| rand::thread_rng().gen());
        tracing::info!("Shuffle seed: {}", seed);

        // ── Step 5: Save config ───────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.output_dir);
        ckpt_manager.save_config(&cfg)?;

        // ── Step 6: Train ─────────────────────────────────────────────────────
        run_training(&cfg, dataset)
    }
}
