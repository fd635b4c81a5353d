/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 分类器相关错误类型
 */

use thiserror::Error;

use crate::data::DataError;

/// 分类器编译、训练、推理与持久化错误
#[derive(Debug, Error)]
pub enum ModelError {
    /// 训练前未调用 compile
    #[error("模型尚未编译，请先调用 compile")]
    NotCompiled,

    #[error("形状不匹配（{message}）：期望 {expected:?}，实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    /// 损失出现 NaN/Inf
    #[error("第 {epoch} 轮训练发散：loss = {loss}")]
    Diverged { epoch: usize, loss: f32 },

    #[error("无效操作: {0}")]
    InvalidOperation(String),

    #[error("数据错误: {0}")]
    Data(#[from] DataError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 模型描述或参数的（反）序列化失败
    #[error("序列化失败: {0}")]
    Serialization(String),

    #[error("写出 npy 失败: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),
}
