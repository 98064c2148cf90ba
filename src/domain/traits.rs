// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The application layer loads training images through a trait
// rather than a concrete loader, so the same pipeline runs on:
//   - Cifar10Loader     → CIFAR-10 binary batches
//   - ImageFolderLoader → a directory of .png files
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::image::RawImage;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can load a set of training images.
pub trait ImageSource {
    /// Load all available images from this source.
    fn load_all(&self) -> Result<Vec<RawImage>>;

    /// Short human readable name used in log lines
    fn describe(&self) -> String;
}
