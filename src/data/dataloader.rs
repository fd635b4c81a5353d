/*
 * @Author       : 老董
 * @Date         : 2026-02-11
 * @Description  : TensorDataset 与 DataLoader
 *
 * TensorDataset 持有预处理后的输入 [N, H, W, 1] 与 one-hot 标签 [N, C]；
 * DataLoader 按 batch_size 切分，支持带种子的随机打乱和丢弃不完整批次。
 */

use ndarray::{Array2, Array4, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::class_set::ClassSet;
use super::error::DataError;
use super::split::RawSplit;
use super::transforms::{prepare_input, prepare_output};

/// TensorDataset - 持有特征和标签的数据集
///
/// # 示例
/// ```ignore
/// let dataset = TensorDataset::from_raw(&train, &classes)?;
/// println!("样本数: {}", dataset.len());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TensorDataset {
    features: Array4<f32>,
    labels: Array2<f32>,
}

impl TensorDataset {
    /// 创建新的 TensorDataset
    ///
    /// features 和 labels 的样本数（第一维）不一致时返回 [`DataError::ShapeMismatch`]。
    pub fn new(features: Array4<f32>, labels: Array2<f32>) -> Result<Self, DataError> {
        let len = features.len_of(Axis(0));
        if len != labels.nrows() {
            return Err(DataError::ShapeMismatch {
                expected: vec![len, labels.ncols()],
                got: labels.shape().to_vec(),
            });
        }
        Ok(Self { features, labels })
    }

    /// 由原始划分做完整预处理（归一化 + 重编号 + one-hot）
    pub fn from_raw(split: &RawSplit, classes: &ClassSet) -> Result<Self, DataError> {
        let features = prepare_input(split.images());
        let labels = prepare_output(split.labels(), classes)?;
        Self::new(features, labels)
    }

    pub fn len(&self) -> usize {
        self.labels.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn features(&self) -> &Array4<f32> {
        &self.features
    }

    pub fn labels(&self) -> &Array2<f32> {
        &self.labels
    }

    /// 单个样本的输入形状（不含 batch 维度），如 [28, 28, 1]
    pub fn sample_shape(&self) -> [usize; 3] {
        let (_, h, w, c) = self.features.dim();
        [h, w, c]
    }

    /// 类别数（one-hot 向量长度）
    pub fn num_classes(&self) -> usize {
        self.labels.ncols()
    }

    /// 按索引提取子集（顺序与 `indices` 一致）
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}

/// DataLoader - 数据批量加载器
///
/// # 示例
/// ```ignore
/// let loader = DataLoader::new(&dataset, 128)
///     .shuffle(true)
///     .seed(12);
///
/// for (x_batch, y_batch) in loader.iter() {
///     // ...
/// }
/// ```
pub struct DataLoader<'a> {
    dataset: &'a TensorDataset,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl<'a> DataLoader<'a> {
    /// 创建新的 DataLoader
    ///
    /// `batch_size` 为 0 时按 1 处理。
    pub fn new(dataset: &'a TensorDataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 本轮的样本顺序
    fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            match self.seed {
                Some(seed) => indices.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => indices.shuffle(&mut rand::thread_rng()),
            }
        }
        indices
    }

    /// 创建迭代器
    pub fn iter(&self) -> DataLoaderIterator<'a> {
        DataLoaderIterator {
            dataset: self.dataset,
            batch_size: self.batch_size,
            drop_last: self.drop_last,
            indices: self.indices(),
            current_batch: 0,
        }
    }
}

/// DataLoader 迭代器，产出 (features [B, H, W, 1], labels [B, C])
pub struct DataLoaderIterator<'a> {
    dataset: &'a TensorDataset,
    batch_size: usize,
    drop_last: bool,
    indices: Vec<usize>,
    current_batch: usize,
}

impl Iterator for DataLoaderIterator<'_> {
    type Item = (Array4<f32>, Array2<f32>);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.indices.len();
        let start = self.current_batch * self.batch_size;
        if start >= n {
            return None;
        }

        let end = (start + self.batch_size).min(n);
        if self.drop_last && end - start < self.batch_size {
            return None;
        }
        self.current_batch += 1;

        let batch = &self.indices[start..end];
        Some((
            self.dataset.features.select(Axis(0), batch),
            self.dataset.labels.select(Axis(0), batch),
        ))
    }
}
