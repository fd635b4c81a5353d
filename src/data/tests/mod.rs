mod split;

use ndarray::{Array1, Array3};

use crate::data::{RawSplit, SplitKind};

/// 构造合成划分：第 i 个样本的像素 [0,0] 为其标签，像素 [0,1] 为原始下标
pub(super) fn synthetic_split(kind: SplitKind, labels: &[u8]) -> RawSplit {
    let mut images = Array3::<u8>::zeros((labels.len(), 4, 4));
    for (i, &label) in labels.iter().enumerate() {
        images[[i, 0, 0]] = label;
        images[[i, 0, 1]] = i as u8;
        images[[i, 3, 3]] = 255;
    }
    RawSplit::new(kind, images, Array1::from(labels.to_vec())).unwrap()
}
