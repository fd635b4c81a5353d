/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : Adam优化器实现
 */

use ndarray::{ArrayD, ArrayViewMutD, Zip};

use super::base::{Optimizer, check_shapes};
use crate::nn::ModelError;

/// Adam优化器
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// 一阶矩估计（按参数位置）
    m: Vec<ArrayD<f32>>,
    /// 二阶矩估计（按参数位置）
    v: Vec<ArrayD<f32>>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 创建新的Adam优化器
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    /// 使用默认参数创建Adam优化器
    pub fn new_default(learning_rate: f32) -> Self {
        Self::new(learning_rate, 0.9, 0.999, 1e-8)
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new_default(1e-3)
    }
}

impl Optimizer for Adam {
    fn step(
        &mut self,
        params: &mut [ArrayViewMutD<'_, f32>],
        grads: &[ArrayD<f32>],
    ) -> Result<(), ModelError> {
        check_shapes(params, grads)?;
        if self.m.len() != params.len() {
            self.m = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.v = grads.iter().map(|g| ArrayD::zeros(g.raw_dim())).collect();
            self.t = 0;
        }
        self.t += 1;

        let (beta1, beta2, eps, lr) = (self.beta1, self.beta2, self.epsilon, self.learning_rate);
        // 偏差修正系数
        let bias1 = 1.0 - beta1.powi(self.t as i32);
        let bias2 = 1.0 - beta2.powi(self.t as i32);

        for (((param, grad), m), v) in params
            .iter_mut()
            .zip(grads)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            // m = β1 * m + (1 - β1) * g ; v = β2 * v + (1 - β2) * g²
            Zip::from(&mut *m).and(grad).for_each(|m, &g| *m = beta1 * *m + (1.0 - beta1) * g);
            Zip::from(&mut *v)
                .and(grad)
                .for_each(|v, &g| *v = beta2 * *v + (1.0 - beta2) * g * g);

            // θ = θ - α * m_hat / (√v_hat + ε)
            Zip::from(param).and(&*m).and(&*v).for_each(|p, &m, &v| {
                let m_hat = m / bias1;
                let v_hat = v / bias2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
