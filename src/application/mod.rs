// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal
// (training, or sampling from a trained generator).
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// The image generation workflow
pub mod sample_use_case;
