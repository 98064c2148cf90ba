// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// All Burn network and training code lives here.
//
//   model.rs   : DCGAN-style generator and critic, weight init
//   clip.rs    : ModuleMapper that clamps critic weights
//   trainer.rs : the WGAN critic / generator alternation,
//                per-epoch sample grids and checkpoints
//   sampler.rs : generate images from a (restored) generator
//
// Reference: Burn Book §3 (Building Blocks)
//            Radford et al. (2015) DCGAN
//            Arjovsky et al. (2017) Wasserstein GAN

/// Generator and critic architectures
pub mod model;

/// Critic weight clipping
pub mod clip;

/// WGAN training loop
pub mod trainer;

/// Image generation from a trained generator
pub mod sampler;
