// ============================================================
// Layer 5: Critic Weight Clipping
// ============================================================
// A WGAN critic must stay (approximately) K-Lipschitz. The
// original WGAN recipe enforces this by clamping every critic
// parameter into [-c, c] before each critic update.
//
// Burn exposes "visit every parameter" through ModuleMapper:
// module.map(&mut mapper) rebuilds the module with each float
// parameter passed through map_float.
//
// Only trainable parameters are clipped. Batch norm running
// mean / variance also reach map_float but carry no gradient,
// so they are passed through untouched.
//
// Clamping has to happen on the INNER (non-autodiff) tensor,
// otherwise the clamp itself would be recorded in the graph.
// The parameter id is preserved so the optimiser state for
// that parameter stays attached.
//
// Reference: Arjovsky et al. (2017) Wasserstein GAN
//            Burn Book §3 (Modules)

use burn::{
    module::{ModuleMapper, Param},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

/// Clamp every float parameter into [min, max].
#[derive(Debug, Clone, Copy)]
pub struct WeightClip {
    pub min: f32,
    pub max: f32,
}

impl WeightClip {
    /// Symmetric clip range [-value, value]
    pub fn symmetric(value: f32) -> Self {
        Self { min: -value, max: value }
    }
}

impl<B: AutodiffBackend> ModuleMapper<B> for WeightClip {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let (id, tensor, mapper) = param.consume();
        if !tensor.is_require_grad() {
            return Param::from_mapped_value(id, tensor, mapper);
        }

        let clamped = Tensor::from_inner(tensor.inner().clamp(self.min, self.max)).require_grad();
        Param::from_mapped_value(id, clamped, mapper)
    }
}
