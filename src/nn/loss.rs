//! Softmax、交叉熵与准确率
//!
//! ## 数值稳定计算
//! ```text
//! softmax(x)_i = exp(x_i - max(x)) / Σ exp(x_j - max(x))
//! L = -Σ y_i * log(softmax(x)_i)
//! ```

use ndarray::{Array2, ArrayBase, Axis, Data, Ix2, Zip};
use serde::{Deserialize, Serialize};

use crate::data::transforms::argmax_rows;

/// 损失函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// 多分类交叉熵（标签为 one-hot）
    #[default]
    CategoricalCrossentropy,
}

impl Loss {
    /// 由 softmax 概率与 one-hot 标签计算批次平均损失
    pub fn compute<S1, S2>(&self, probs: &ArrayBase<S1, Ix2>, labels: &ArrayBase<S2, Ix2>) -> f32
    where
        S1: Data<Elem = f32>,
        S2: Data<Elem = f32>,
    {
        match self {
            Self::CategoricalCrossentropy => categorical_crossentropy(probs, labels),
        }
    }

    /// 损失对 logits 的梯度（已除以批大小）
    ///
    /// Softmax 与交叉熵合并后：∂L/∂x = (softmax(x) - y) / B
    pub fn grad_logits<S1, S2>(
        &self,
        probs: &ArrayBase<S1, Ix2>,
        labels: &ArrayBase<S2, Ix2>,
    ) -> Array2<f32>
    where
        S1: Data<Elem = f32>,
        S2: Data<Elem = f32>,
    {
        match self {
            Self::CategoricalCrossentropy => {
                let batch = probs.nrows().max(1) as f32;
                (probs - labels) / batch
            }
        }
    }
}

/// 训练与验证时汇报的指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
}

/// 按行计算数值稳定的 softmax
pub fn softmax<S>(logits: &ArrayBase<S, Ix2>) -> Array2<f32>
where
    S: Data<Elem = f32>,
{
    let mut result = logits.to_owned();
    for mut row in result.axis_iter_mut(Axis(0)) {
        let max_val = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max_val).exp());
        let sum_exp = row.sum();
        row.mapv_inplace(|v| v / sum_exp);
    }
    result
}

/// 交叉熵（批次平均），概率下限截断避免 log(0)
pub fn categorical_crossentropy<S1, S2>(
    probs: &ArrayBase<S1, Ix2>,
    labels: &ArrayBase<S2, Ix2>,
) -> f32
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    let batch = probs.nrows();
    if batch == 0 {
        return 0.0;
    }
    let mut total = 0.0f32;
    Zip::from(probs).and(labels).for_each(|&p, &y| {
        if y > 0.0 {
            total -= y * p.max(1e-7).ln();
        }
    });
    total / batch as f32
}

/// 预测类别与 one-hot 标签一致的样本数
pub fn count_correct<S1, S2>(probs: &ArrayBase<S1, Ix2>, labels: &ArrayBase<S2, Ix2>) -> usize
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    argmax_rows(probs)
        .into_iter()
        .zip(argmax_rows(labels))
        .filter(|(pred, truth)| pred == truth)
        .count()
}

/// 准确率（0-1）
pub fn accuracy<S1, S2>(probs: &ArrayBase<S1, Ix2>, labels: &ArrayBase<S2, Ix2>) -> f32
where
    S1: Data<Elem = f32>,
    S2: Data<Elem = f32>,
{
    match probs.nrows() {
        0 => 0.0,
        n => count_correct(probs, labels) as f32 / n as f32,
    }
}
