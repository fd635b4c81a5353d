/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 优化器基础trait和辅助函数
 */

use enum_dispatch::enum_dispatch;
use ndarray::{ArrayD, ArrayViewMutD};

use super::{Adam, SGD};
use crate::nn::ModelError;

/// 优化器核心 trait
#[enum_dispatch]
pub trait Optimizer {
    /// 参数更新（使用已计算的梯度）
    ///
    /// `params` 与 `grads` 按位置一一对应；同一优化器每次调用时参数顺序须保持一致，
    /// 有状态的优化器（如 Adam）按位置保存各参数的矩估计。
    fn step(
        &mut self,
        params: &mut [ArrayViewMutD<'_, f32>],
        grads: &[ArrayD<f32>],
    ) -> Result<(), ModelError>;

    /// 重置累积状态
    fn reset(&mut self);

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);
}

/// 可用的优化器
#[enum_dispatch(Optimizer)]
#[derive(Debug, Clone)]
pub enum OptimizerKind {
    SGD(SGD),
    Adam(Adam),
}

impl Default for OptimizerKind {
    fn default() -> Self {
        Self::Adam(Adam::default())
    }
}

/// 检查参数与梯度的数量和形状一致
pub(super) fn check_shapes(
    params: &[ArrayViewMutD<'_, f32>],
    grads: &[ArrayD<f32>],
) -> Result<(), ModelError> {
    if params.len() != grads.len() {
        return Err(ModelError::ShapeMismatch {
            expected: vec![params.len()],
            got: vec![grads.len()],
            message: "参数与梯度数量不一致".to_string(),
        });
    }
    for (param, grad) in params.iter().zip(grads) {
        if param.shape() != grad.shape() {
            return Err(ModelError::ShapeMismatch {
                expected: param.shape().to_vec(),
                got: grad.shape().to_vec(),
                message: "参数与梯度形状不一致".to_string(),
            });
        }
    }
    Ok(())
}
