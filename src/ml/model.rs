use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        BatchNorm, BatchNormConfig,
        Initializer,
        LeakyRelu, LeakyReluConfig,
        PaddingConfig2d,
        Relu, Tanh,
    },
    prelude::*,
    tensor::Distribution,
};

/// Square kernel used by every (transposed) convolution
const KERNEL: usize = 4;

/// Hidden channel widths, deepest first for the generator
const GENERATOR_WIDTHS: [usize; 4] = [512, 256, 128, 64];

/// Hidden channel widths, shallowest first for the critic
const CRITIC_WIDTHS: [usize; 4] = [64, 128, 256, 512];

/// Negative slope of the critic's LeakyReLU
const LEAKY_SLOPE: f64 = 0.2;

/// Conv weights ~ N(0, 0.02), batch norm scale ~ N(1, 0.02)
const INIT_STD: f64 = 0.02;

fn conv_initializer() -> Initializer {
    Initializer::Normal { mean: 0.0, std: INIT_STD }
}

/// Critic convolution: weight ~ N(0, 0.02), bias keeps the
/// fan-in uniform range U(-1/sqrt(fan_in), 1/sqrt(fan_in)).
fn critic_conv<B: Backend>(
    channels: [usize; 2],
    stride:   usize,
    padding:  usize,
    device:   &B::Device,
) -> Conv2d<B> {
    let mut conv = Conv2dConfig::new(channels, [KERNEL, KERNEL])
        .with_stride([stride, stride])
        .with_padding(PaddingConfig2d::Explicit(padding, padding))
        .init(device);

    let [in_channels, out_channels] = channels;
    let bound = 1.0 / ((in_channels * KERNEL * KERNEL) as f64).sqrt();

    conv.weight = Param::from_tensor(Tensor::random(
        [out_channels, in_channels, KERNEL, KERNEL],
        Distribution::Normal(0.0, INIT_STD),
        device,
    ));
    conv.bias = Some(Param::from_tensor(Tensor::random(
        [out_channels],
        Distribution::Uniform(-bound, bound),
        device,
    )));
    conv
}

/// Batch norm with scale ~ N(1, 0.02) and shift = 0.
fn batch_norm<B: Backend>(channels: usize, device: &B::Device) -> BatchNorm<B> {
    let mut norm = BatchNormConfig::new(channels).init(device);
    norm.gamma = Param::from_tensor(Tensor::random(
        [channels],
        Distribution::Normal(1.0, INIT_STD),
        device,
    ));
    norm
}

// ─── Generator ────────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct GeneratorConfig {
    /// Length of the latent noise vector
    #[config(default = 100)]
    pub noise_dim: usize,

    /// Colour channels of the generated images
    #[config(default = 3)]
    pub channels: usize,
}

impl GeneratorConfig {
    /// noise [N, nz, 1, 1] → 4x4 → 8x8 → 16x16 → 32x32 → image [N, 3, 64, 64]
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let mut blocks = Vec::with_capacity(GENERATOR_WIDTHS.len());
        let mut in_channels = self.noise_dim;

        for (i, &out_channels) in GENERATOR_WIDTHS.iter().enumerate() {
            // First block projects 1x1 → 4x4, the rest double the size
            let (stride, padding) = if i == 0 { (1, 0) } else { (2, 1) };
            let conv = ConvTranspose2dConfig::new([in_channels, out_channels], [KERNEL, KERNEL])
                .with_stride([stride, stride])
                .with_padding([padding, padding])
                .with_bias(false)
                .with_initializer(conv_initializer())
                .init(device);

            blocks.push(UpBlock {
                conv,
                norm: batch_norm(out_channels, device),
                activation: Relu::new(),
            });
            in_channels = out_channels;
        }

        let output = ConvTranspose2dConfig::new([in_channels, self.channels], [KERNEL, KERNEL])
            .with_stride([2, 2])
            .with_padding([1, 1])
            .with_bias(false)
            .with_initializer(conv_initializer())
            .init(device);

        Generator { blocks, output, activation: Tanh::new() }
    }
}

/// Transposed conv → batch norm → ReLU
#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    pub conv:       ConvTranspose2d<B>,
    pub norm:       BatchNorm<B>,
    pub activation: Relu,
}

impl<B: Backend> UpBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.activation.forward(self.norm.forward(self.conv.forward(x)))
    }
}

#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    pub blocks:     Vec<UpBlock<B>>,
    pub output:     ConvTranspose2d<B>,
    pub activation: Tanh,
}

impl<B: Backend> Generator<B> {
    /// noise: [batch, noise_dim, 1, 1] → images: [batch, 3, 64, 64] in [-1, 1]
    pub fn forward(&self, noise: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = noise;
        for block in &self.blocks {
            x = block.forward(x);
        }
        self.activation.forward(self.output.forward(x))
    }
}

/// Draw `count` latent vectors ~ N(0, 1), shaped for the generator.
pub fn sample_noise<B: Backend>(count: usize, noise_dim: usize, device: &B::Device) -> Tensor<B, 4> {
    Tensor::random([count, noise_dim, 1, 1], Distribution::Normal(0.0, 1.0), device)
}

// ─── Critic ───────────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct CriticConfig {
    /// Colour channels of the input images
    #[config(default = 3)]
    pub channels: usize,
}

impl CriticConfig {
    /// image [N, 3, 64, 64] → 32x32 → 16x16 → 8x8 → 4x4 → score [N, 1, 1, 1]
    pub fn init<B: Backend>(&self, device: &B::Device) -> Critic<B> {
        let mut blocks = Vec::with_capacity(CRITIC_WIDTHS.len());
        let mut in_channels = self.channels;

        for (i, &out_channels) in CRITIC_WIDTHS.iter().enumerate() {
            let conv = critic_conv([in_channels, out_channels], 2, 1, device);

            // No batch norm straight after the input layer
            let norm = (i > 0).then(|| batch_norm(out_channels, device));

            blocks.push(DownBlock {
                conv,
                norm,
                activation: LeakyReluConfig::new().with_negative_slope(LEAKY_SLOPE).init(),
            });
            in_channels = out_channels;
        }

        let output = critic_conv([in_channels, 1], 1, 0, device);

        Critic { blocks, output }
    }
}

/// Conv → (batch norm) → LeakyReLU
#[derive(Module, Debug)]
pub struct DownBlock<B: Backend> {
    pub conv:       Conv2d<B>,
    pub norm:       Option<BatchNorm<B>>,
    pub activation: LeakyRelu,
}

impl<B: Backend> DownBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = match &self.norm {
            Some(norm) => norm.forward(x),
            None => x,
        };
        self.activation.forward(x)
    }
}

#[derive(Module, Debug)]
pub struct Critic<B: Backend> {
    pub blocks: Vec<DownBlock<B>>,
    pub output: Conv2d<B>,
}

impl<B: Backend> Critic<B> {
    /// Per-image scores: [batch, 3, 64, 64] → [batch, 1, 1, 1]
    pub fn scores(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut x = images;
        for block in &self.blocks {
            x = block.forward(x);
        }
        self.output.forward(x)
    }

    /// Batch-mean score as a single-element tensor [1].
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 1> {
        self.scores(images).mean()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_generator_output_shape_and_range() {
        let device = Default::default();
        let generator: Generator<TestBackend> = GeneratorConfig::new().init(&device);

        let noise  = sample_noise::<TestBackend>(2, 100, &device);
        let images = generator.forward(noise);
        assert_eq!(images.dims(), [2, 3, 64, 64]);

        let values = images.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_generator_respects_noise_dim() {
        let device = Default::default();
        let generator: Generator<TestBackend> = GeneratorConfig::new().with_noise_dim(16).init(&device);
        assert_eq!(generator.blocks[0].conv.weight.val().dims(), [16, 512, 4, 4]);
        assert!(generator.output.bias.is_none());
    }

    #[test]
    fn test_critic_reduces_to_single_score() {
        let device = Default::default();
        let critic: Critic<TestBackend> = CriticConfig::new().init(&device);

        let images = Tensor::<TestBackend, 4>::zeros([3, 3, 64, 64], &device);
        assert_eq!(critic.scores(images.clone()).dims(), [3, 1, 1, 1]);
        assert_eq!(critic.forward(images).dims(), [1]);
    }

    #[test]
    fn test_critic_first_block_has_no_norm() {
        let device = Default::default();
        let critic: Critic<TestBackend> = CriticConfig::new().init(&device);
        assert!(critic.blocks[0].norm.is_none());
        assert!(critic.blocks[1..].iter().all(|b| b.norm.is_some()));
    }

    #[test]
    fn test_batch_norm_scale_init_near_one() {
        let device = Default::default();
        let norm: BatchNorm<TestBackend> = batch_norm(512, &device);

        let gamma = norm.gamma.val().into_data().to_vec::<f32>().unwrap();
        let beta  = norm.beta.val().into_data().to_vec::<f32>().unwrap();
        assert!(gamma.iter().all(|g| (g - 1.0).abs() < 0.2));
        assert!(beta.iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_critic_conv_init_splits_weight_and_bias() {
        let device = Default::default();
        // fan_in = 3 * 4 * 4 = 48 → bias bound ≈ 0.144
        let conv: Conv2d<TestBackend> = critic_conv([3, 64], 2, 1, &device);
        let bound = 1.0 / 48f32.sqrt();

        let weight = conv.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(weight.len(), 64 * 3 * 4 * 4);
        assert!(weight.iter().all(|w| w.abs() < 6.0 * 0.02));

        let bias = conv.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap();
        let max  = bias.iter().fold(0.0f32, |m, b| m.max(b.abs()));
        assert!(max <= bound + f32::EPSILON);
        // 64 uniform draws almost surely reach past 4 std of N(0, 0.02)
        assert!(max > 0.08);
    }
}
