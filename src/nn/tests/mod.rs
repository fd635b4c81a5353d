mod optimizer; // 优化器测试模块（包含 sgd, adam 子模块）

use ndarray::{Array2, Array4};

use crate::data::TensorDataset;

/// 两类线性可分的小数据集：类别 0 的像素集中在左半边，类别 1 集中在右半边
///
/// 输入 [n, 2, 2, 1]，标签为 one-hot [n, 2]。
pub(super) fn separable_dataset(n: usize) -> TensorDataset {
    let mut features = Array4::<f32>::zeros((n, 2, 2, 1));
    let mut labels = Array2::<f32>::zeros((n, 2));
    for i in 0..n {
        let class = i % 2;
        let strength = 0.6 + 0.4 * ((i / 2) % 3) as f32 / 2.0;
        for row in 0..2 {
            features[[i, row, class, 0]] = strength;
        }
        labels[[i, class]] = 1.0;
    }
    TensorDataset::new(features, labels).unwrap()
}
