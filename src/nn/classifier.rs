/*
 * @Author       : 老董
 * @Date         : 2026-02-13
 * @Description  : 分类器抽象：compile / fit / evaluate / predict / weights
 *
 * `fit` 提供默认实现：逐轮调用 `train_epoch` 与 `evaluate`，
 * 每轮结束后依次通知回调，任一回调返回 Stop 即结束训练。
 */

use ndarray::{Array2, Array4, ArrayD};

use super::callback::{Callback, CallbackAction};
use super::error::ModelError;
use super::history::{EpochRecord, History};
use super::loss::{Loss, Metric};
use super::optimizer::OptimizerKind;
use crate::data::TensorDataset;

/// 编译选项（损失、优化器、指标）
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub loss: Loss,
    pub optimizer: OptimizerKind,
    pub metrics: Vec<Metric>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            loss: Loss::CategoricalCrossentropy,
            optimizer: OptimizerKind::default(),
            metrics: vec![Metric::Accuracy],
        }
    }
}

/// fit 的训练参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// 最大轮数
    pub epochs: usize,
    pub batch_size: usize,
    /// 打乱训练数据的种子，第 `e` 轮使用 `seed + e`
    pub seed: u64,
}

/// 在某个数据集上的评估结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
}

/// 分类器
pub trait Classifier {
    /// 设置损失、优化器与指标；训练前必须调用
    fn compile(&mut self, options: CompileOptions) -> Result<(), ModelError>;

    fn is_compiled(&self) -> bool;

    /// 在训练集上跑一轮（含参数更新），返回本轮训练损失与准确率
    fn train_epoch(
        &mut self,
        train: &TensorDataset,
        batch_size: usize,
        seed: u64,
    ) -> Result<Evaluation, ModelError>;

    /// 在数据集上评估（不更新参数）
    fn evaluate(&self, data: &TensorDataset, batch_size: usize) -> Result<Evaluation, ModelError>;

    /// 输入 [N, H, W, 1]，输出每个样本的类别概率 [N, C]
    fn predict(&self, inputs: &Array4<f32>) -> Result<Array2<f32>, ModelError>;

    /// 按层顺序排列的全部参数
    fn weights(&self) -> Vec<ArrayD<f32>>;

    /// 各层参数形状与总参数量
    fn summary(&self) -> String {
        let weights = self.weights();
        let mut lines = vec![format!("{:<10}{:<20}{:>10}", "Weight", "Shape", "Params")];
        for (i, w) in weights.iter().enumerate() {
            lines.push(format!("{:<10}{:<20}{:>10}", i, format!("{:?}", w.shape()), w.len()));
        }
        let total: usize = weights.iter().map(ArrayD::len).sum();
        lines.push(format!("Total params: {total}"));
        lines.join("\n")
    }

    /// 训练：每轮先训练再验证，并通知回调
    ///
    /// 返回的历史长度等于实际跑过的轮数（不超过 `options.epochs`）。
    /// 训练损失出现 NaN/Inf 时返回 [`ModelError::Diverged`]。
    fn fit(
        &mut self,
        train: &TensorDataset,
        validation: &TensorDataset,
        options: &FitOptions,
        callbacks: &mut [&mut dyn Callback],
    ) -> Result<History, ModelError> {
        if !self.is_compiled() {
            return Err(ModelError::NotCompiled);
        }

        let mut history = History::default();
        for callback in callbacks.iter_mut() {
            callback.on_train_begin();
        }

        for epoch in 0..options.epochs {
            let seed = options.seed.wrapping_add(epoch as u64);
            let train_eval = self.train_epoch(train, options.batch_size, seed)?;
            if !train_eval.loss.is_finite() {
                return Err(ModelError::Diverged {
                    epoch,
                    loss: train_eval.loss,
                });
            }
            let val_eval = self.evaluate(validation, options.batch_size)?;

            let record = EpochRecord {
                epoch,
                loss: train_eval.loss,
                accuracy: train_eval.accuracy,
                val_loss: val_eval.loss,
                val_accuracy: val_eval.accuracy,
            };
            history.push(record);
            tracing::info!(
                epoch = epoch + 1,
                epochs = options.epochs,
                loss = record.loss,
                accuracy = record.accuracy,
                val_loss = record.val_loss,
                val_accuracy = record.val_accuracy,
                "epoch 完成"
            );

            let mut stop = false;
            for callback in callbacks.iter_mut() {
                if callback.on_epoch_end(&record) == CallbackAction::Stop {
                    stop = true;
                }
            }
            if stop {
                break;
            }
        }

        for callback in callbacks.iter_mut() {
            callback.on_train_end(&history);
        }
        Ok(history)
    }
}
