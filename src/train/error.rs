/*
 * @Author       : 老董
 * @Date         : 2026-02-14
 * @Description  : 训练编排错误类型
 */

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::nn::ModelError;

/// 训练编排错误
///
/// 分类器内部错误（如损失发散）原样包装后向上传递，不做重试。
#[derive(Debug, Error)]
pub enum TrainError {
    /// 训练集与验证集（或与配置）的形状不一致
    #[error("形状不匹配（{message}）：期望 {expected:?}，实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("{0}为空")]
    EmptyDataset(&'static str),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
