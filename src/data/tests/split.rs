//! 划分筛选与 load_data 单元测试

use ndarray::{Array1, Array3};

use super::synthetic_split;
use crate::data::{
    ClassSet, DataError, DatasetSource, InMemorySource, RawSplit, SplitKind, load_data,
    load_data_for_labels,
};

const TRAIN_LABELS: [u8; 12] = [5, 0, 4, 1, 9, 2, 1, 3, 1, 4, 3, 5];
const TEST_LABELS: [u8; 6] = [7, 2, 1, 0, 4, 1];

fn source() -> InMemorySource {
    InMemorySource::new(
        synthetic_split(SplitKind::Train, &TRAIN_LABELS),
        synthetic_split(SplitKind::Test, &TEST_LABELS),
        10,
    )
}

/// 总是失败的数据源（模拟网络或缓存故障）
struct BrokenSource;

impl DatasetSource for BrokenSource {
    fn fetch(&self) -> Result<(RawSplit, RawSplit), DataError> {
        Err(DataError::DownloadError("连接超时".to_string()))
    }

    fn num_labels(&self) -> usize {
        10
    }
}

#[test]
fn test_raw_split_length_mismatch() {
    let images = Array3::<u8>::zeros((3, 2, 2));
    let labels = Array1::from(vec![1u8, 2]);
    let result = RawSplit::new(SplitKind::Train, images, labels);
    assert!(matches!(result, Err(DataError::ShapeMismatch { .. })));
}

#[test]
fn test_filter_keeps_exactly_members() {
    let split = synthetic_split(SplitKind::Train, &TRAIN_LABELS);
    let classes = ClassSet::new(vec![1, 3]).unwrap();
    let filtered = split.filter(&classes);

    // 每个保留的标签都在集合中
    assert!(filtered.labels().iter().all(|&l| classes.contains(l)));
    // 集合中的样本一个不少
    let expected = TRAIN_LABELS.iter().filter(|&&l| l == 1 || l == 3).count();
    assert_eq!(filtered.len(), expected);
    assert_eq!(filtered.kind(), SplitKind::Train);
}

#[test]
fn test_filter_preserves_alignment_and_order() {
    let split = synthetic_split(SplitKind::Train, &TRAIN_LABELS);
    let classes = ClassSet::new(vec![4, 1]).unwrap();
    let filtered = split.filter(&classes);

    let mut last_index = None;
    for i in 0..filtered.len() {
        let (image, label) = filtered.get(i).unwrap();
        // 图像中记录的标签与对应下标的标签一致
        assert_eq!(image[[0, 0]], label);
        // 原始下标严格递增，筛选没有打乱顺序
        let original = image[[0, 1]];
        assert_eq!(TRAIN_LABELS[original as usize], label);
        if let Some(prev) = last_index {
            assert!(original > prev);
        }
        last_index = Some(original);
    }
}

#[test]
fn test_filter_with_no_matches_is_empty() {
    let split = synthetic_split(SplitKind::Test, &TEST_LABELS);
    let filtered = split.filter(&ClassSet::new(vec![8]).unwrap());
    assert!(filtered.is_empty());
    assert_eq!(filtered.image_dim(), (4, 4));
}

#[test]
fn test_load_data_filters_both_splits() {
    let classes = ClassSet::new(vec![0, 1]).unwrap();
    let (train, test) = load_data(&source(), &classes).unwrap();

    assert_eq!(train.labels().to_vec(), vec![0, 1, 1, 1]);
    assert_eq!(test.labels().to_vec(), vec![1, 0, 1]);
    assert_eq!(train.kind(), SplitKind::Train);
    assert_eq!(test.kind(), SplitKind::Test);
}

#[test]
fn test_load_data_empty_class_list() {
    let result = load_data_for_labels(&source(), &[]);
    assert!(matches!(result, Err(DataError::EmptyClassSet)));
}

#[test]
fn test_load_data_class_out_of_range() {
    // 参考配置中曾出现的类别 10 在 MNIST 中不存在
    let classes = ClassSet::new((0..=10).collect()).unwrap();
    let result = load_data(&source(), &classes);
    assert!(matches!(result, Err(DataError::ClassOutOfRange { label: 10, .. })));
}

#[test]
fn test_load_data_source_failure_is_unavailable() {
    let result = load_data(&BrokenSource, &ClassSet::digits());
    match result {
        Err(DataError::DataUnavailable(msg)) => assert!(msg.contains("连接超时")),
        other => panic!("期望 DataUnavailable，实际 {other:?}"),
    }
}

#[test]
fn test_label_counts() {
    let split = synthetic_split(SplitKind::Train, &TRAIN_LABELS);
    let counts = split.label_counts();
    assert_eq!(counts.len(), 10);
    assert_eq!(counts[1], 3);
    assert_eq!(counts[5], 2);
    assert_eq!(counts[6], 0);
    assert_eq!(counts.iter().sum::<usize>(), TRAIN_LABELS.len());
}

#[test]
fn test_get_out_of_bounds() {
    let split = synthetic_split(SplitKind::Test, &TEST_LABELS);
    let result = split.get(TEST_LABELS.len());
    assert!(matches!(
        result,
        Err(DataError::IndexOutOfBounds { index: 6, len: 6 })
    ));
}
