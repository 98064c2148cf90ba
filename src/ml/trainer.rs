// ============================================================
// Layer 5: WGAN Training Loop
// ============================================================
// Alternates critic and generator updates:
//
//   for each epoch:
//     while batches remain:
//       up to `critic_iter` times (one real batch each):
//         clamp critic weights to [-clip, clip]
//         critic_loss = D(real) - D(G(z).detach())
//         RMSprop step on the critic
//       generator_loss = D(G(z))          (z from the last critic step)
//       RMSprop step on the generator
//     save a grid of G(fixed_noise) and a checkpoint
//
// Backends:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - train_loop is generic so tests can run on Autodiff<NdArray>
//
// Reference: Arjovsky et al. (2017) Wasserstein GAN, Algorithm 1
//            Burn Book §5 (Custom training loop)

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::Module,
    optim::{GradientsParams, Optimizer, RmsPropConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::{ImageBatch, ImageBatcher}, dataset::ImageDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    image_writer::ImageWriter,
    metrics::{MetricsLogger, StepMetrics},
};
use crate::ml::{
    clip::WeightClip,
    model::{sample_noise, Critic, CriticConfig, Generator, GeneratorConfig},
    sampler::to_sample_batch,
};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Shuffle seed used when the config doesn't carry one
const DEFAULT_SEED: u64 = 42;

/// RMSprop smoothing constant and epsilon
const RMSPROP_ALPHA:   f32 = 0.99;
const RMSPROP_EPSILON: f32 = 1e-8;

pub fn run_training(cfg: &TrainConfig, dataset: ImageDataset) -> Result<Vec<StepMetrics>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(cfg, dataset, device)
}

/// Single-element loss tensor → f64
fn scalar<B: Backend>(loss: &Tensor<B, 1>) -> f64 {
    loss.clone().into_scalar().elem::<f64>()
}

fn rmsprop() -> RmsPropConfig {
    RmsPropConfig::new()
        .with_alpha(RMSPROP_ALPHA)
        .with_epsilon(RMSPROP_EPSILON)
}

/// One critic update on a real batch.
///
/// The critic is clipped first, then trained to minimise
/// D(real) - D(G(noise)). The generator only supplies detached
/// fakes. Returns the updated critic and the loss before the step.
pub fn critic_step<B, O>(
    critic:    Critic<B>,
    generator: &Generator<B>,
    real:      Tensor<B, 4>,
    noise:     Tensor<B, 4>,
    clip:      &mut WeightClip,
    optim:     &mut O,
    lr:        f64,
) -> (Critic<B>, f64)
where
    B: AutodiffBackend,
    O: Optimizer<Critic<B>, B>,
{
    let critic = critic.map(clip);

    let real_score = critic.forward(real);
    let fake       = generator.forward(noise).detach();
    let fake_score = critic.forward(fake);

    let loss   = real_score - fake_score;
    let d_loss = scalar(&loss);

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &critic);
    (optim.step(lr, critic, grads), d_loss)
}

/// One generator update minimising D(G(noise)).
/// Only generator gradients are applied; the critic is read-only.
pub fn generator_step<B, O>(
    generator: Generator<B>,
    critic:    &Critic<B>,
    noise:     Tensor<B, 4>,
    optim:     &mut O,
    lr:        f64,
) -> (Generator<B>, f64)
where
    B: AutodiffBackend,
    O: Optimizer<Generator<B>, B>,
{
    let loss   = critic.forward(generator.forward(noise));
    let g_loss = scalar(&loss);

    let grads = loss.backward();
    let grads = GradientsParams::from_grads(grads, &generator);
    (optim.step(lr, generator, grads), g_loss)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:     &TrainConfig,
    dataset: ImageDataset,
    device:  B::Device,
) -> Result<Vec<StepMetrics>> {
    if dataset.sample_count() == 0 {
        bail!("The dataset is empty; nothing to train on");
    }

    // ── Build models ──────────────────────────────────────────────────────────
    let mut generator: Generator<B> = GeneratorConfig::new()
        .with_noise_dim(cfg.noise_dim)
        .init(&device);
    let mut critic: Critic<B> = CriticConfig::new().init(&device);
    tracing::info!(
        "Models ready: generator {} params, critic {} params",
        generator.num_params(),
        critic.num_params(),
    );

    // ── RMSprop optimisers ────────────────────────────────────────────────────
    // v = α*v + (1-α)*g²
    // θ = θ - lr * g / (√v + ε)
    let optim_cfg = rmsprop();
    let mut critic_optim    = optim_cfg.init::<B, Critic<B>>();
    let mut generator_optim = optim_cfg.init::<B, Generator<B>>();

    let mut clip = WeightClip::symmetric(cfg.clip_value);

    // ── Data loader ───────────────────────────────────────────────────────────
    let seed = cfg.seed.unwrap_or(DEFAULT_SEED);
    let loader: Arc<dyn DataLoader<B, ImageBatch<B>>> = DataLoaderBuilder::new(ImageBatcher::new())
        .batch_size(cfg.batch_size)
        .shuffle(seed)
        .num_workers(cfg.num_workers)
        .set_device(device.clone())
        .build(dataset);
    let num_batches = loader.num_items().div_ceil(cfg.batch_size);

    // ── Outputs ───────────────────────────────────────────────────────────────
    let ckpt_manager = CheckpointManager::new(&cfg.output_dir);
    let image_writer = ImageWriter::new(&cfg.output_dir)?;
    let mut metrics  = MetricsLogger::new(&cfg.output_dir)?;

    // Same latent vectors every epoch so the sample grids are comparable
    let fixed_noise = sample_noise::<B>(cfg.sample_count, cfg.noise_dim, &device);

    let mut count = 0usize;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        let mut batches      = loader.iter();
        let mut data_counter = 0usize;

        while data_counter < num_batches {

            // ── Critic phase ──────────────────────────────────────────────────
            let mut critic_counter = 0usize;
            let mut last_step: Option<(Tensor<B, 4>, f64)> = None;

            while data_counter < num_batches && critic_counter < cfg.critic_iter {
                let Some(batch) = batches.next() else {
                    // Loader ran dry early; close out the epoch
                    data_counter = num_batches;
                    break;
                };
                critic_counter += 1;
                data_counter   += 1;

                let batch_len = batch.count();
                let noise     = sample_noise::<B>(batch_len, cfg.noise_dim, &device);

                let (updated, d_loss) = critic_step(
                    critic,
                    &generator,
                    batch.images,
                    noise.clone(),
                    &mut clip,
                    &mut critic_optim,
                    cfg.lr,
                );
                critic = updated;

                last_step = Some((noise, d_loss));
            }

            let Some((noise, d_loss)) = last_step else { break };

            // ── Generator phase ───────────────────────────────────────────────
            let (updated, g_loss) =
                generator_step(generator, &critic, noise, &mut generator_optim, cfg.lr);
            generator = updated;

            println!(
                "[{}/{}][{}/{}] DLoss: {:.4} GLoss: {:.4}",
                epoch, cfg.epochs, data_counter, num_batches, d_loss, g_loss,
            );

            count += 1;
            metrics.log(StepMetrics::new(count, epoch, d_loss, g_loss))?;
        }

        // ── End of epoch: sample grid + checkpoint ────────────────────────────
        let samples = to_sample_batch(generator.forward(fixed_noise.clone()).detach())?;
        let path    = image_writer.save_epoch(epoch, &samples.values, samples.dims)?;
        tracing::info!("Saved samples for epoch {} to '{}'", epoch, path.display());

        ckpt_manager.save_models(&generator, &critic, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    if let Some(s) = metrics.summary() {
        tracing::info!(
            "Training complete: {} generator steps | last DLoss={:.4} GLoss={:.4} | mean DLoss={:.4} GLoss={:.4}",
            s.steps,
            s.last_discriminator_loss,
            s.last_generator_loss,
            s.mean_discriminator_loss,
            s.mean_generator_loss,
        );
    }
    tracing::info!("Loss history written to '{}'", metrics.csv_path().display());

    Ok(metrics.history().to_vec())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    use crate::data::transforms::ImageTransform;
    use crate::domain::image::{RawImage, CHANNELS};

    type TestBackend = Autodiff<NdArray>;

    const NOISE_DIM: usize = 8;

    fn tiny_dataset(n: usize) -> ImageDataset {
        let images = (0..n)
            .map(|i| {
                let value = if i % 2 == 0 { 64 } else { 192 };
                RawImage::new(64, 64, vec![value; CHANNELS * 64 * 64], None).unwrap()
            })
            .collect();
        ImageDataset::new(images, ImageTransform::new(64))
    }

    fn tiny_config(output_dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            output_dir:   output_dir.to_string_lossy().into_owned(),
            batch_size:   2,
            sample_count: 2,
            epochs:       1,
            noise_dim:    NOISE_DIM,
            num_workers:  1,
            seed:         Some(7),
            ..TrainConfig::default()
        }
    }

    fn models() -> (Generator<TestBackend>, Critic<TestBackend>) {
        let device = Default::default();
        let generator = GeneratorConfig::new().with_noise_dim(NOISE_DIM).init(&device);
        let critic    = CriticConfig::new().init(&device);
        (generator, critic)
    }

    fn real_batch() -> Tensor<TestBackend, 4> {
        Tensor::random([4, 3, 64, 64], Distribution::Uniform(-1.0, 1.0), &Default::default())
    }

    fn values<const D: usize>(tensor: Tensor<TestBackend, D>) -> Vec<f32> {
        tensor.into_data().to_vec::<f32>().unwrap()
    }

    /// Every trainable critic value: conv weights and biases, norm scales and shifts.
    fn critic_parameters(critic: &Critic<TestBackend>) -> Vec<f32> {
        let mut out = values(critic.output.weight.val());
        if let Some(bias) = &critic.output.bias {
            out.extend(values(bias.val()));
        }
        for block in &critic.blocks {
            out.extend(values(block.conv.weight.val()));
            if let Some(bias) = &block.conv.bias {
                out.extend(values(bias.val()));
            }
            if let Some(norm) = &block.norm {
                out.extend(values(norm.gamma.val()));
                out.extend(values(norm.beta.val()));
            }
        }
        out
    }

    fn wasserstein_gap(
        critic:    &Critic<TestBackend>,
        generator: &Generator<TestBackend>,
        real:      Tensor<TestBackend, 4>,
        noise:     Tensor<TestBackend, 4>,
    ) -> f64 {
        let fake = generator.forward(noise).detach();
        scalar(&(critic.forward(real) - critic.forward(fake)))
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny_config(dir.path());
        let empty = ImageDataset::new(Vec::new(), ImageTransform::new(64));
        let result = train_loop::<TestBackend>(&cfg, empty, Default::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_one_generator_step_per_critic_iter_batches() {
        let dir = tempfile::tempdir().unwrap();
        // 3 images, batch 2 → 2 batches; critic_iter 1 → 2 generator steps
        let cfg = TrainConfig { critic_iter: 1, ..tiny_config(dir.path()) };

        let history = train_loop::<TestBackend>(&cfg, tiny_dataset(3), Default::default()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].count, 2);
        assert!(history.iter().all(|m| m.epoch == 0));
        assert!(history.iter().all(|m| m.discriminator_loss.is_finite() && m.generator_loss.is_finite()));

        assert!(dir.path().join("fake_samples_epoch_000.png").exists());
        assert!(dir.path().join("loss_history.csv").exists());
        assert!(dir.path().join("checkpoints/generator_epoch_0.mpk.gz").exists());
    }

    #[test]
    fn test_critic_iter_groups_batches() {
        let dir = tempfile::tempdir().unwrap();
        // 2 batches, critic_iter 5 → both consumed by one critic phase
        let cfg = tiny_config(dir.path());

        let history = train_loop::<TestBackend>(&cfg, tiny_dataset(3), Default::default()).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_generator_step_leaves_critic_weights_alone() {
        let device = Default::default();
        let (generator, critic) = models();
        let mut optim = rmsprop().init::<TestBackend, Generator<TestBackend>>();

        let critic_before    = critic_parameters(&critic);
        let generator_before = values(generator.output.weight.val());

        let noise = sample_noise::<TestBackend>(4, NOISE_DIM, &device);
        let (generator, g_loss) = generator_step(generator, &critic, noise, &mut optim, 1e-3);

        assert!(g_loss.is_finite());
        assert_eq!(critic_parameters(&critic), critic_before);
        assert_ne!(values(generator.output.weight.val()), generator_before);
    }

    #[test]
    fn test_critic_step_lowers_real_minus_fake_score() {
        let device = Default::default();
        let (generator, critic) = models();
        let mut clip  = WeightClip::symmetric(0.01);
        let mut optim = rmsprop().init::<TestBackend, Critic<TestBackend>>();

        // Clip up front so the step's own clamp doesn't move the baseline
        let critic = critic.map(&mut clip);
        let real   = real_batch();
        let noise  = sample_noise::<TestBackend>(4, NOISE_DIM, &device);

        let before = wasserstein_gap(&critic, &generator, real.clone(), noise.clone());
        let (critic, d_loss) = critic_step(
            critic,
            &generator,
            real.clone(),
            noise.clone(),
            &mut clip,
            &mut optim,
            1e-5,
        );
        let after = wasserstein_gap(&critic, &generator, real, noise);

        // Reported loss is D(real) - D(fake), not its negation
        assert!((d_loss - before).abs() < 1e-6);
        assert!(after < before, "gap went from {before} to {after}");
    }

    #[test]
    fn test_critic_step_clips_before_updating() {
        let device = Default::default();
        let (generator, critic) = models();
        let mut clip  = WeightClip::symmetric(0.01);
        let mut optim = rmsprop().init::<TestBackend, Critic<TestBackend>>();

        // Batch norm scales start near 1.0
        assert!(critic_parameters(&critic).iter().any(|v| v.abs() > 0.5));

        let noise = sample_noise::<TestBackend>(4, NOISE_DIM, &device);
        let (critic, _) =
            critic_step(critic, &generator, real_batch(), noise, &mut clip, &mut optim, 1e-6);

        // One RMSprop step moves each value by at most ~10 * lr
        assert!(critic_parameters(&critic).iter().all(|v| v.abs() <= 0.01 + 1e-4));
    }
}
