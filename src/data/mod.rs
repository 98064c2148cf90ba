// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything from files on disk to image tensor batches:
//
//   CIFAR-10 .bin batches      folder of .png files
//          │                          │
//          ▼                          ▼
//   Cifar10Loader              ImageFolderLoader
//          └───────────┬──────────────┘
//                      ▼
//   ImageDataset       → implements Burn's Dataset trait; runs
//                        ImageTransform (resize, center crop,
//                        normalise to [-1, 1]) on each get()
//                      │
//                      ▼
//   ImageBatcher       → stacks samples into [N, 3, S, S] tensors
//                      │
//                      ▼
//   DataLoader         → shuffled batches for the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the CIFAR-10 binary training batches
pub mod cifar;

/// Reads a directory of .png images
pub mod folder;

/// Resize / crop / normalise
pub mod transforms;

/// Implements Burn's Dataset trait for image samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
