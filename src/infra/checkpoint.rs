// ============================================================
// Layer 6: Checkpoint Manager
// ============================================================
// Saves and restores the generator and critic weights using
// Burn's NamedMpkGzFileRecorder (MessagePack + gzip) at full
// precision, so a reload gives back bit-identical weights.
//
// File naming convention:
//   <output_dir>/checkpoints/
//     generator_epoch_0.mpk.gz   ← weights after epoch 0
//     critic_epoch_0.mpk.gz
//     ...
//     latest_epoch.json          ← number of the latest epoch
//     train_config.json          ← hyperparameters of the run
//
// The config is saved before training starts so the `sample`
// command can rebuild a generator with the right noise_dim
// before loading weights into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{Critic, Generator};

/// Writes `<name>.mpk.gz`, f32 weights kept as-is
type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Sub-directory of the output directory holding checkpoints
pub const CHECKPOINT_DIR: &str = "checkpoints";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Checkpoints live in `<output_dir>/checkpoints`.
    /// The directory is created if it doesn't already exist.
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let dir = output_dir.as_ref().join(CHECKPOINT_DIR);
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save both networks for a given epoch and move the
    /// latest-epoch pointer forward.
    pub fn save_models<B: Backend>(
        &self,
        generator: &Generator<B>,
        critic:    &Critic<B>,
        epoch:     usize,
    ) -> Result<()> {
        self.save_record(generator.clone(), &format!("generator_epoch_{epoch}"))?;
        self.save_record(critic.clone(), &format!("critic_epoch_{epoch}"))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    fn save_record<B: Backend, M: Module<B>>(&self, module: M, name: &str) -> Result<()> {
        // Recorder adds the .mpk.gz extension
        let path = self.dir.join(name);
        CheckpointRecorder::new()
            .record(module.into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        Ok(())
    }

    /// Load generator weights from `epoch`, or from the latest
    /// saved epoch when `epoch` is None.
    pub fn load_generator<B: Backend>(
        &self,
        model:  Generator<B>,
        epoch:  Option<usize>,
        device: &B::Device,
    ) -> Result<Generator<B>> {
        let epoch = match epoch {
            Some(e) => e,
            None => self.latest_epoch()?,
        };
        let path = self.dir.join(format!("generator_epoch_{epoch}"));

        tracing::info!("Loading generator from epoch {}", epoch);

        let record = CheckpointRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'sample'.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }

    /// Read latest_epoch.json and return the epoch number.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_epoch.json'. Have you run 'train' first?")?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}
