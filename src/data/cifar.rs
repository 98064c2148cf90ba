// ============================================================
// Layer 4: CIFAR-10 Loader
// ============================================================
// Reads the CIFAR-10 "binary version" training batches:
//
//   <data_dir>/cifar-10-batches-bin/
//     data_batch_1.bin
//     ...
//     data_batch_5.bin
//
// Each file is a flat sequence of 3073-byte records:
//
//   <1 byte label><1024 red><1024 green><1024 blue>
//
// The colour planes are row-major 32x32, so a record maps
// directly onto our planar RawImage with no reshuffling.
//
// Nothing is downloaded: the batches must already exist.

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::image::{RawImage, CHANNELS};
use crate::domain::traits::ImageSource;

/// Width and height of every CIFAR-10 image
pub const CIFAR_SIDE: usize = 32;

/// Bytes per record: label + 3 planes of 32x32
pub const RECORD_LEN: usize = 1 + CHANNELS * CIFAR_SIDE * CIFAR_SIDE;

/// Sub-directory created by extracting cifar-10-binary.tar.gz
pub const BATCH_DIR: &str = "cifar-10-batches-bin";

/// The five training batch files
pub const TRAIN_BATCHES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];

/// Loads the CIFAR-10 training split from its binary batches.
pub struct Cifar10Loader {
    /// Path to the `cifar-10-batches-bin` directory
    batch_dir: PathBuf,
}

impl Cifar10Loader {
    /// `data_dir` is the dataset root (the directory that
    /// contains `cifar-10-batches-bin`).
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self { batch_dir: data_dir.as_ref().join(BATCH_DIR) }
    }
}

impl ImageSource for Cifar10Loader {
    fn load_all(&self) -> Result<Vec<RawImage>> {
        if !self.batch_dir.is_dir() {
            bail!(
                "CIFAR-10 directory '{}' not found. Download and extract \
                 cifar-10-binary.tar.gz into the data directory first.",
                self.batch_dir.display()
            );
        }

        let mut images = Vec::new();
        for name in TRAIN_BATCHES {
            let path  = self.batch_dir.join(name);
            let bytes = fs::read(&path)
                .with_context(|| format!("Cannot read CIFAR-10 batch '{}'", path.display()))?;

            let batch = parse_batch(&bytes)
                .with_context(|| format!("Malformed CIFAR-10 batch '{}'", path.display()))?;
            tracing::debug!("Loaded {} images from {}", batch.len(), name);
            images.extend(batch);
        }

        Ok(images)
    }

    fn describe(&self) -> String {
        format!("CIFAR-10 ({})", self.batch_dir.display())
    }
}

/// Decode one binary batch file into images.
pub fn parse_batch(bytes: &[u8]) -> Result<Vec<RawImage>> {
    if bytes.len() % RECORD_LEN != 0 {
        bail!(
            "Batch length {} is not a multiple of the {}-byte record size",
            bytes.len(), RECORD_LEN
        );
    }

    bytes
        .chunks_exact(RECORD_LEN)
        .map(|record| {
            RawImage::new(
                CIFAR_SIDE,
                CIFAR_SIDE,
                record[1..].to_vec(),
                Some(record[0]),
            )
        })
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: u8, fill: u8) -> Vec<u8> {
        let mut r = vec![label];
        r.extend(std::iter::repeat(fill).take(RECORD_LEN - 1));
        r
    }

    #[test]
    fn test_parse_two_records() {
        let mut bytes = record(3, 10);
        bytes.extend(record(7, 20));

        let images = parse_batch(&bytes).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].label, Some(3));
        assert_eq!(images[1].label, Some(7));
        assert_eq!(images[1].width, 32);
        assert!(images[1].pixels.iter().all(|&p| p == 20));
    }

    #[test]
    fn test_truncated_batch_is_rejected() {
        let bytes = vec![0u8; RECORD_LEN + 5];
        assert!(parse_batch(&bytes).is_err());
    }

    #[test]
    fn test_planes_map_to_channels() {
        let mut r = vec![0u8];
        r.extend(std::iter::repeat(1).take(1024)); // red
        r.extend(std::iter::repeat(2).take(1024)); // green
        r.extend(std::iter::repeat(3).take(1024)); // blue

        let img = &parse_batch(&r).unwrap()[0];
        assert_eq!(img.at(0, 31, 31), 1);
        assert_eq!(img.at(1, 0, 0), 2);
        assert_eq!(img.at(2, 5, 17), 3);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir    = tempfile::tempdir().unwrap();
        let loader = Cifar10Loader::new(dir.path());
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_loads_all_five_batches() {
        let dir   = tempfile::tempdir().unwrap();
        let batch = dir.path().join(BATCH_DIR);
        fs::create_dir_all(&batch).unwrap();
        for (i, name) in TRAIN_BATCHES.iter().enumerate() {
            fs::write(batch.join(name), record(i as u8, 0)).unwrap();
        }

        let images = Cifar10Loader::new(dir.path()).load_all().unwrap();
        assert_eq!(images.len(), 5);
        assert_eq!(images[4].label, Some(4));
    }
}
