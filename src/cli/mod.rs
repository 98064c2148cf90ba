// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and delegates to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`  : trains the WGAN, writing sample grids,
//                 checkpoints and the loss history
//   2. `sample` : loads a generator checkpoint and writes a
//                 grid of generated images
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SampleArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "wgan-trainer",
    version = "0.1.0",
    about = "Train a Wasserstein GAN on an image dataset, then sample from it."
)]
pub struct Cli {
    /// The subcommand to run (train or sample)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)  => run_train(args),
            Commands::Sample(args) => run_sample(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on images in: {}", args.data_dir);

    let output_dir = args.output_dir.clone();
    let use_case   = TrainUseCase::new(args.into());
    let history    = use_case.execute()?;

    println!(
        "Training complete. {} generator steps; outputs in '{}'.",
        history.len(),
        output_dir
    );
    Ok(())
}

/// Handles the `sample` subcommand.
fn run_sample(args: SampleArgs) -> Result<()> {
    use crate::application::sample_use_case::SampleUseCase;

    let use_case = SampleUseCase::new(args.output_dir, args.epoch)?;
    let path     = use_case.generate(args.count, args.out.as_deref())?;

    println!("\nSamples written to: {}", path.display());
    Ok(())
}
