/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 梯度下降优化器实现
 */

use ndarray::{ArrayD, ArrayViewMutD, Zip};

use super::base::{Optimizer, check_shapes};
use crate::nn::ModelError;

/// SGD (随机梯度下降) 优化器
#[derive(Debug, Clone)]
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    /// 创建新的SGD优化器
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for SGD {
    fn step(
        &mut self,
        params: &mut [ArrayViewMutD<'_, f32>],
        grads: &[ArrayD<f32>],
    ) -> Result<(), ModelError> {
        check_shapes(params, grads)?;
        let lr = self.learning_rate;
        for (param, grad) in params.iter_mut().zip(grads) {
            // 梯度下降更新：θ = θ - α * ∇θ
            Zip::from(param).and(grad).for_each(|p, &g| *p -= lr * g);
        }
        Ok(())
    }

    fn reset(&mut self) {}

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
