// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the training and sampling
// workflows:
//
//   checkpoint.rs   : generator / critic weights via Burn's
//                     full-precision NamedMpkGzFileRecorder,
//                     plus TrainConfig as JSON
//
//   metrics.rs      : per-step critic and generator losses,
//                     kept in memory and appended to a CSV
//
//   image_writer.rs : min-max normalised PNG grids of
//                     generated samples
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Loss history CSV logger
pub mod metrics;

/// Sample grid PNG export
pub mod image_writer;
