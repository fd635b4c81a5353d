/*
 * @Author       : 老董
 * @Date         : 2026-02-14
 * @Description  : 训练编排：校验数据形状，按配置驱动分类器训练并启用早停
 *
 * 可复现性：分类器的初始权重由构造时的种子决定，每轮的打乱顺序由 `seed + epoch` 决定。
 * 当前所有数值计算都在单线程内完成；若将来换用并行的矩阵内核，
 * 浮点累加顺序可能变化，结果只在数值误差范围内一致。
 */

mod error;

#[cfg(test)]
mod tests;

pub use error::TrainError;

use crate::config::TrainConfig;
use crate::data::TensorDataset;
use crate::nn::{Callback, Classifier, EarlyStopping, FitOptions, History};

/// 训练编排器
///
/// 每次 [`Trainer::train`] 都是独立的一次运行，不在运行之间共享可变状态。
///
/// # 示例
/// ```ignore
/// let trainer = Trainer::new(TrainConfig::default())?;
/// let history = trainer.train(&mut model, &train, &test)?;
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    /// 配置非法时返回 [`TrainError::Config`]
    pub fn new(config: TrainConfig) -> Result<Self, TrainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            epochs: self.config.max_epochs,
            batch_size: self.config.batch_size,
            seed: self.config.seed,
        }
    }

    /// 检查训练集与验证集的形状是否一致，且标签宽度等于类别数
    pub fn check_datasets(
        &self,
        train: &TensorDataset,
        validation: &TensorDataset,
    ) -> Result<(), TrainError> {
        if train.is_empty() {
            return Err(TrainError::EmptyDataset("训练集"));
        }
        if validation.is_empty() {
            return Err(TrainError::EmptyDataset("验证集"));
        }
        for (name, dataset) in [("训练集", train), ("验证集", validation)] {
            if dataset.features().len_of(ndarray::Axis(0)) != dataset.labels().nrows() {
                return Err(TrainError::ShapeMismatch {
                    expected: vec![dataset.features().len_of(ndarray::Axis(0))],
                    got: vec![dataset.labels().nrows()],
                    message: format!("{name}输入与标签数量不一致"),
                });
            }
        }
        if train.sample_shape() != validation.sample_shape() {
            return Err(TrainError::ShapeMismatch {
                expected: train.sample_shape().to_vec(),
                got: validation.sample_shape().to_vec(),
                message: "验证集输入形状与训练集不一致".to_string(),
            });
        }

        let num_classes = self.config.classes.len();
        for (name, dataset) in [("训练集", train), ("验证集", validation)] {
            if dataset.num_classes() != num_classes {
                return Err(TrainError::ShapeMismatch {
                    expected: vec![dataset.len(), num_classes],
                    got: dataset.labels().shape().to_vec(),
                    message: format!("{name}标签宽度与类别数不一致"),
                });
            }
        }
        Ok(())
    }

    /// 训练一个已编译的分类器，启用早停（监控验证准确率）
    pub fn train<C>(
        &self,
        model: &mut C,
        train: &TensorDataset,
        validation: &TensorDataset,
    ) -> Result<History, TrainError>
    where
        C: Classifier + ?Sized,
    {
        self.train_with_callbacks(model, train, validation, &mut [])
    }

    /// 同 [`Trainer::train`]，附加额外的回调
    ///
    /// 早停总是第一个被通知的回调。
    pub fn train_with_callbacks<C>(
        &self,
        model: &mut C,
        train: &TensorDataset,
        validation: &TensorDataset,
        extra: &mut [&mut dyn Callback],
    ) -> Result<History, TrainError>
    where
        C: Classifier + ?Sized,
    {
        self.check_datasets(train, validation)?;
        let options = self.fit_options();
        tracing::info!(
            train_samples = train.len(),
            validation_samples = validation.len(),
            classes = ?self.config.classes.labels(),
            batch_size = options.batch_size,
            max_epochs = options.epochs,
            patience = self.config.patience,
            seed = options.seed,
            "开始训练"
        );

        let mut early_stopping = EarlyStopping::new(self.config.patience);
        let mut callbacks: Vec<&mut dyn Callback> = Vec::with_capacity(extra.len() + 1);
        callbacks.push(&mut early_stopping);
        for callback in extra.iter_mut() {
            callbacks.push(&mut **callback);
        }

        let mut history = model.fit(train, validation, &options, &mut callbacks)?;
        drop(callbacks);
        history.set_stopped_epoch(early_stopping.stopped_epoch());

        tracing::info!(
            epochs_run = history.len(),
            stopped_epoch = ?history.stopped_epoch(),
            best_val_accuracy = ?history.best_val_accuracy().map(|r| r.val_accuracy),
            "训练结束"
        );
        Ok(history)
    }
}
