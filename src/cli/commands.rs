// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `sample`,
// and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::train_use_case::{DatasetKind, TrainConfig};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a WGAN on CIFAR-10 or a folder of PNG images
    Train(TrainArgs),

    /// Generate images with a trained generator checkpoint
    Sample(SampleArgs),
}

/// `--dataset` values, mapped onto the application's DatasetKind
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetArg {
    /// CIFAR-10 binary batches under <data-dir>/cifar-10-batches-bin
    Cifar10,
    /// Every .png file directly inside <data-dir>
    Folder,
}

impl From<DatasetArg> for DatasetKind {
    fn from(a: DatasetArg) -> Self {
        match a {
            DatasetArg::Cifar10 => DatasetKind::Cifar10,
            DatasetArg::Folder  => DatasetKind::Folder,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset root (contains cifar-10-batches-bin, or the .png files)
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    /// Dataset format
    #[arg(long, value_enum, default_value_t = DatasetArg::Cifar10)]
    pub dataset: DatasetArg,

    /// Directory for sample grids, checkpoints and the loss history
    #[arg(long, default_value = "./WGANOutput")]
    pub output_dir: String,

    /// Real images per batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Images generated from the fixed noise after each epoch
    #[arg(long, default_value_t = 64)]
    pub sample_count: usize,

    /// Number of full passes through the dataset
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// RMSprop learning rate for both networks
    #[arg(long, default_value_t = 2e-4)]
    pub lr: f64,

    /// Critic updates per generator update
    #[arg(long, default_value_t = 5)]
    pub critic_iter: usize,

    /// Length of the latent noise vector
    #[arg(long, default_value_t = 100)]
    pub noise_dim: usize,

    /// Critic weights are clamped to [-clip_value, clip_value]
    #[arg(long, default_value_t = 0.01)]
    pub clip_value: f32,

    /// Data loader worker threads
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Shuffle seed (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:     a.data_dir,
            dataset:      a.dataset.into(),
            output_dir:   a.output_dir,
            batch_size:   a.batch_size,
            sample_count: a.sample_count,
            epochs:       a.epochs,
            lr:           a.lr,
            critic_iter:  a.critic_iter,
            noise_dim:    a.noise_dim,
            clip_value:   a.clip_value,
            num_workers:  a.num_workers,
            seed:         a.seed,
        }
    }
}

/// All arguments for the `sample` command
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Output directory of the training run
    #[arg(long, default_value = "./WGANOutput")]
    pub output_dir: String,

    /// Checkpoint epoch to load (latest when omitted)
    #[arg(long)]
    pub epoch: Option<usize>,

    /// Number of images to generate
    #[arg(long, default_value_t = 64)]
    pub count: usize,

    /// PNG file to write (defaults to <output_dir>/generated_samples.png)
    #[arg(long)]
    pub out: Option<PathBuf>,
}
