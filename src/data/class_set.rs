//! 类别集合
//!
//! 有序、无重复的标签序列。第 `i` 个位置上的原始标签在训练时被重新编号为 `i`。

use serde::{Deserialize, Serialize};

use super::error::DataError;

/// 参与训练的类别（有序，无重复）
///
/// # 示例
/// ```
/// use mnist_trainer::data::ClassSet;
///
/// let classes = ClassSet::new(vec![3, 7]).unwrap();
/// assert_eq!(classes.position(7), Some(1));
/// assert_eq!(classes.label_at(0), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ClassSet {
    labels: Vec<u8>,
}

impl ClassSet {
    /// 创建类别集合
    ///
    /// 空集合返回 [`DataError::EmptyClassSet`]，重复标签返回 [`DataError::DuplicateClass`]。
    pub fn new(labels: Vec<u8>) -> Result<Self, DataError> {
        if labels.is_empty() {
            return Err(DataError::EmptyClassSet);
        }
        for (i, &label) in labels.iter().enumerate() {
            if labels[..i].contains(&label) {
                return Err(DataError::DuplicateClass(label));
            }
        }
        Ok(Self { labels })
    }

    /// MNIST 全部 10 个数字
    pub fn digits() -> Self {
        Self {
            labels: (0..10).collect(),
        }
    }

    /// 类别数量（即 one-hot 向量长度）
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// 恒为 false（构造时已拒绝空集合）
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: u8) -> bool {
        self.labels.contains(&label)
    }

    /// 原始标签在集合中的位置（即训练时的类别索引）
    pub fn position(&self, label: u8) -> Option<usize> {
        self.labels.iter().position(|&c| c == label)
    }

    /// 训练类别索引对应的原始标签
    pub fn label_at(&self, index: usize) -> Option<u8> {
        self.labels.get(index).copied()
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// 检查所有类别都在数据源的标签范围 `[0, num_labels)` 内
    pub fn check_range(&self, num_labels: usize) -> Result<(), DataError> {
        match self.labels.iter().find(|&&c| c as usize >= num_labels) {
            Some(&label) => Err(DataError::ClassOutOfRange { label, num_labels }),
            None => Ok(()),
        }
    }
}

impl Default for ClassSet {
    fn default() -> Self {
        Self::digits()
    }
}

impl TryFrom<Vec<u8>> for ClassSet {
    type Error = DataError;

    fn try_from(labels: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

impl From<ClassSet> for Vec<u8> {
    fn from(classes: ClassSet) -> Self {
        classes.labels
    }
}
