//! 数据加载模块
//!
//! 提供数据集加载、按类别筛选、预处理和批处理功能。
//!
//! # 主要组件
//!
//! - [`ClassSet`]: 参与训练的类别（有序，决定重编号）
//! - [`DatasetSource`]: 数据源接口；[`MnistSource`] 与 [`InMemorySource`] 为其实现
//! - [`load_data`]: 从数据源加载并筛选 train/test 划分
//! - [`transforms`]: 输入归一化、标签重编号与 one-hot 编码
//! - [`TensorDataset`] / [`DataLoader`]: 预处理后的数据集与批量加载器
//! - [`idx`]: IDX 二进制格式读写
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use mnist_trainer::data::{ClassSet, MnistSource, TensorDataset, load_data};
//!
//! let classes = ClassSet::new(vec![3, 7])?;
//! let (train, test) = load_data(&MnistSource::with_defaults(), &classes)?;
//! let train = TensorDataset::from_raw(&train, &classes)?;
//! ```

mod class_set;
mod dataloader;
pub mod download;
pub mod error;
pub mod idx;
mod mnist;
mod split;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use class_set::ClassSet;
pub use dataloader::{DataLoader, DataLoaderIterator, TensorDataset};
pub use error::DataError;
pub use mnist::{
    CacheCheck, MNIST_IMAGE_SIZE, MNIST_NUM_LABELS, MnistSource, check_cached_file,
    default_data_dir,
};
pub use split::{
    DatasetSource, InMemorySource, RawSplit, SplitKind, load_data, load_data_for_labels,
};
