//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 数据加载、筛选与编码相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 数据源无法获取（网络、缓存或文件损坏）
    #[error("数据源不可用: {0}")]
    DataUnavailable(String),

    /// 类别集合为空
    #[error("类别集合不能为空")]
    EmptyClassSet,

    /// 类别集合中存在重复标签
    #[error("类别集合中存在重复标签: {0}")]
    DuplicateClass(u8),

    /// 类别超出数据源的标签范围
    #[error("类别 {label} 超出数据源标签范围 [0, {num_labels})")]
    ClassOutOfRange { label: u8, num_labels: usize },

    /// 标签不在类别集合中
    #[error("标签 {0} 不在类别集合中")]
    LabelNotInClassSet(u8),

    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如 magic number 不匹配）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 形状不匹配
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 下载错误
    #[error("下载错误: {0}")]
    DownloadError(String),

    /// 校验和不匹配
    #[error("校验和不匹配: 期望 {expected}, 实际 {got}")]
    ChecksumMismatch { expected: String, got: String },
}

impl DataError {
    /// 将数据源内部错误归并为 [`DataError::DataUnavailable`]
    ///
    /// 配置类错误（类别集合相关）原样保留。
    pub fn into_unavailable(self) -> Self {
        match self {
            Self::DataUnavailable(_)
            | Self::EmptyClassSet
            | Self::DuplicateClass(_)
            | Self::ClassOutOfRange { .. } => self,
            other => Self::DataUnavailable(other.to_string()),
        }
    }
}
