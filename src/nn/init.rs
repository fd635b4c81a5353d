//! 参数初始化策略

use ndarray::{Array, Dimension, ShapeBuilder};
use rand::Rng;
use rand::rngs::StdRng;

/// 参数初始化策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Softmax/Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的数组（使用指定的 RNG）
    ///
    /// `fan_in` / `fan_out` 取自形状的前两维；一维形状的 `fan_out` 视为 1。
    pub fn generate<D, Sh>(&self, shape: Sh, rng: &mut StdRng) -> Array<f32, D>
    where
        D: Dimension,
        Sh: ShapeBuilder<Dim = D>,
    {
        let zeros = Array::zeros(shape);
        let dims = zeros.shape();
        let fan_in = dims.first().copied().unwrap_or(1).max(1);
        let fan_out = dims.get(1).copied().unwrap_or(1);

        let (mean, std) = match *self {
            Self::Zeros => return zeros,
            Self::Normal { mean, std } => (mean, std),
            Self::Kaiming => (0.0, (2.0 / fan_in as f32).sqrt()),
            Self::Xavier => (0.0, (2.0 / (fan_in + fan_out) as f32).sqrt()),
        };
        zeros.mapv(|_| mean + std * standard_normal(rng))
    }
}

/// Box-Muller 变换采样标准正态分布
fn standard_normal(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.gen_range(f32::MIN_POSITIVE..1.0);
    let u2: f32 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos()
}
