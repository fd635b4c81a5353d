/*
 * @Author       : 老董
 * @Date         : 2026-02-10
 * @Description  : 原始样本划分（train/test）、数据源接口与按类别筛选
 */

use std::fmt;

use ndarray::{Array1, Array3, ArrayView2, Axis};

use super::class_set::ClassSet;
use super::error::DataError;

/// 划分名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitKind {
    Train,
    Test,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// 原始样本集合：图像 [N, H, W]（0-255）与标签 [N]，按下标一一对应
#[derive(Debug, Clone, PartialEq)]
pub struct RawSplit {
    kind: SplitKind,
    images: Array3<u8>,
    labels: Array1<u8>,
}

impl RawSplit {
    /// 创建划分，图像与标签数量不一致时返回 [`DataError::ShapeMismatch`]
    pub fn new(kind: SplitKind, images: Array3<u8>, labels: Array1<u8>) -> Result<Self, DataError> {
        if images.len_of(Axis(0)) != labels.len() {
            return Err(DataError::ShapeMismatch {
                expected: vec![images.len_of(Axis(0))],
                got: vec![labels.len()],
            });
        }
        Ok(Self {
            kind,
            images,
            labels,
        })
    }

    pub fn kind(&self) -> SplitKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// 单张图像的 (H, W)
    pub fn image_dim(&self) -> (usize, usize) {
        let (_, h, w) = self.images.dim();
        (h, w)
    }

    pub fn images(&self) -> &Array3<u8> {
        &self.images
    }

    pub fn labels(&self) -> &Array1<u8> {
        &self.labels
    }

    /// 获取第 index 个样本 (image, label)
    pub fn get(&self, index: usize) -> Result<(ArrayView2<'_, u8>, u8), DataError> {
        if index >= self.len() {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        Ok((self.images.index_axis(Axis(0), index), self.labels[index]))
    }

    /// 只保留标签属于 `classes` 的样本
    ///
    /// 同一个布尔掩码同时作用于图像和标签，保持下标对齐与原有顺序。
    pub fn filter(&self, classes: &ClassSet) -> Self {
        let mask: Vec<bool> = self.labels.iter().map(|&l| classes.contains(l)).collect();
        let kept: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();

        Self {
            kind: self.kind,
            images: self.images.select(Axis(0), &kept),
            labels: self.labels.select(Axis(0), &kept),
        }
    }

    /// 统计每个标签的样本数，下标为原始标签
    pub fn label_counts(&self) -> Vec<usize> {
        let max = self.labels.iter().copied().max().map_or(0, |m| m as usize + 1);
        let mut counts = vec![0; max];
        for &label in &self.labels {
            counts[label as usize] += 1;
        }
        counts
    }

    /// 拆出图像和标签
    pub fn into_parts(self) -> (Array3<u8>, Array1<u8>) {
        (self.images, self.labels)
    }
}

/// 数据源：返回对齐的 train/test 原始样本
pub trait DatasetSource {
    /// 获取 (train, test) 两个划分
    fn fetch(&self) -> Result<(RawSplit, RawSplit), DataError>;

    /// 数据源标签的取值个数，标签范围为 `[0, num_labels)`
    fn num_labels(&self) -> usize;
}

/// 内存数据源
#[derive(Debug, Clone)]
pub struct InMemorySource {
    train: RawSplit,
    test: RawSplit,
    num_labels: usize,
}

impl InMemorySource {
    pub fn new(train: RawSplit, test: RawSplit, num_labels: usize) -> Self {
        Self {
            train,
            test,
            num_labels,
        }
    }

    /// 由四个数组构建（train 图像、train 标签、test 图像、test 标签）
    pub fn from_arrays(
        train_images: Array3<u8>,
        train_labels: Array1<u8>,
        test_images: Array3<u8>,
        test_labels: Array1<u8>,
        num_labels: usize,
    ) -> Result<Self, DataError> {
        Ok(Self::new(
            RawSplit::new(SplitKind::Train, train_images, train_labels)?,
            RawSplit::new(SplitKind::Test, test_images, test_labels)?,
            num_labels,
        ))
    }
}

impl DatasetSource for InMemorySource {
    fn fetch(&self) -> Result<(RawSplit, RawSplit), DataError> {
        Ok((self.train.clone(), self.test.clone()))
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }
}

/// 从数据源加载数据并只保留 `classes` 中的类别
///
/// # 错误
/// - 类别超出数据源标签范围：[`DataError::ClassOutOfRange`]
/// - 数据源获取失败：[`DataError::DataUnavailable`]
///
/// 空类别集合无法构造出 [`ClassSet`]，在 [`ClassSet::new`] 处即返回 [`DataError::EmptyClassSet`]。
pub fn load_data<S>(source: &S, classes: &ClassSet) -> Result<(RawSplit, RawSplit), DataError>
where
    S: DatasetSource + ?Sized,
{
    classes.check_range(source.num_labels())?;

    let (train, test) = source.fetch().map_err(DataError::into_unavailable)?;
    let (train, test) = (train.filter(classes), test.filter(classes));

    tracing::info!(
        classes = ?classes.labels(),
        train = train.len(),
        test = test.len(),
        "数据加载完成"
    );
    Ok((train, test))
}

/// 同 [`load_data`]，直接接收标签列表并返回构造出的 [`ClassSet`]
///
/// 空列表返回 [`DataError::EmptyClassSet`]，不会得到空的划分。
pub fn load_data_for_labels<S>(
    source: &S,
    labels: &[u8],
) -> Result<(ClassSet, RawSplit, RawSplit), DataError>
where
    S: DatasetSource + ?Sized,
{
    let classes = ClassSet::new(labels.to_vec())?;
    let (train, test) = load_data(source, &classes)?;
    Ok((classes, train, test))
}
