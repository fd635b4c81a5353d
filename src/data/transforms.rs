//! 数据变换函数
//!
//! 图像归一化、标签重编号与 one-hot 编码，以及预测结果到原始标签的反向映射。
//! 所有函数都是纯函数：输入只读，结果写入新分配的数组。

use ndarray::{Array, Array2, ArrayBase, Axis, Data, Dimension, Ix1, Ix2};

use super::class_set::ClassSet;
use super::error::DataError;

/// 将 0-255 像素值归一化到 0-1，并追加大小为 1 的通道维度
///
/// 接受单张图像 [H, W] 或一批图像 [N, H, W]，输出形状分别为 [H, W, 1] / [N, H, W, 1]。
///
/// # 示例
/// ```
/// use ndarray::array;
/// use mnist_trainer::data::transforms::prepare_input;
///
/// let image = array![[0u8, 255], [51, 102]];
/// let prepared = prepare_input(&image);
/// assert_eq!(prepared.shape(), &[2, 2, 1]);
/// assert_eq!(prepared[[0, 1, 0]], 1.0);
/// ```
pub fn prepare_input<S, D>(images: &ArrayBase<S, D>) -> Array<f32, D::Larger>
where
    S: Data<Elem = u8>,
    D: Dimension,
{
    let channel_axis = Axis(images.ndim());
    images
        .mapv(|pixel| f32::from(pixel) / 255.0)
        .insert_axis(channel_axis)
}

/// 将原始标签重编号为其在 `classes` 中的位置
///
/// 标签不在集合中时返回 [`DataError::LabelNotInClassSet`]。
pub fn reindex_labels<S>(
    labels: &ArrayBase<S, Ix1>,
    classes: &ClassSet,
) -> Result<Vec<usize>, DataError>
where
    S: Data<Elem = u8>,
{
    labels
        .iter()
        .map(|&label| {
            classes
                .position(label)
                .ok_or(DataError::LabelNotInClassSet(label))
        })
        .collect()
}

/// 将类别索引转换为 one-hot 编码
///
/// # 参数
/// - `indices`: 类别索引，取值 0..num_classes
/// - `num_classes`: 类别总数
///
/// # 返回
/// one-hot 编码，形状 [N, num_classes]；索引越界返回 [`DataError::IndexOutOfBounds`]
pub fn one_hot(indices: &[usize], num_classes: usize) -> Result<Array2<f32>, DataError> {
    let mut encoded = Array2::zeros((indices.len(), num_classes));
    for (row, &class_idx) in indices.iter().enumerate() {
        if class_idx >= num_classes {
            return Err(DataError::IndexOutOfBounds {
                index: class_idx,
                len: num_classes,
            });
        }
        encoded[[row, class_idx]] = 1.0;
    }
    Ok(encoded)
}

/// 标签预处理：先按 `classes` 重编号，再做 one-hot 编码
///
/// 结果写入新数组，原始标签保持不变，可继续用于预览等用途。
///
/// # 示例
/// ```
/// use ndarray::array;
/// use mnist_trainer::data::{ClassSet, transforms::prepare_output};
///
/// let classes = ClassSet::new(vec![3, 7]).unwrap();
/// let encoded = prepare_output(&array![7u8, 3], &classes).unwrap();
/// assert_eq!(encoded, array![[0.0f32, 1.0], [1.0, 0.0]]);
/// ```
pub fn prepare_output<S>(
    labels: &ArrayBase<S, Ix1>,
    classes: &ClassSet,
) -> Result<Array2<f32>, DataError>
where
    S: Data<Elem = u8>,
{
    let indices = reindex_labels(labels, classes)?;
    one_hot(&indices, classes.len())
}

/// 每行最大值所在的列
pub fn argmax_rows<S>(scores: &ArrayBase<S, Ix2>) -> Vec<usize>
where
    S: Data<Elem = f32>,
{
    scores
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &v)| {
                    if v > best { (i, v) } else { (best_i, best) }
                })
                .0
        })
        .collect()
}

/// 将分类器输出（每行一个样本的类别概率）映射回原始标签
pub fn decode_predictions<S>(
    scores: &ArrayBase<S, Ix2>,
    classes: &ClassSet,
) -> Result<Vec<u8>, DataError>
where
    S: Data<Elem = f32>,
{
    if scores.ncols() != classes.len() {
        return Err(DataError::ShapeMismatch {
            expected: vec![scores.nrows(), classes.len()],
            got: scores.shape().to_vec(),
        });
    }
    argmax_rows(scores)
        .into_iter()
        .map(|i| {
            classes.label_at(i).ok_or(DataError::IndexOutOfBounds {
                index: i,
                len: classes.len(),
            })
        })
        .collect()
}

/// 展平图像
///
/// 形状 [N, ...] → [N, prod(...)]，按逻辑顺序（行优先）排列。
pub fn flatten_images<S, D>(images: &ArrayBase<S, D>) -> Result<Array2<f32>, DataError>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let shape = images.shape();
    if shape.is_empty() {
        return Err(DataError::ShapeMismatch {
            expected: vec![0, 0],
            got: vec![],
        });
    }
    let n = shape[0];
    let features: usize = shape[1..].iter().product();
    let data: Vec<f32> = images.iter().copied().collect();
    Array2::from_shape_vec((n, features), data).map_err(|_| DataError::ShapeMismatch {
        expected: vec![n, features],
        got: shape.to_vec(),
    })
}
