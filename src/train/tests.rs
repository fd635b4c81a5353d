use std::cell::Cell;

use ndarray::{Array2, Array4, ArrayD, IxDyn};

use super::{TrainError, Trainer};
use crate::config::{ConfigError, TrainConfig};
use crate::data::{ClassSet, InMemorySource, TensorDataset, load_data};
use crate::nn::{
    Callback, CallbackAction, Classifier, CompileOptions, DenseClassifier, EpochRecord,
    Evaluation, ModelError, OptimizerKind, SGD,
};

/// 验证准确率按预设序列变化的分类器
struct ScriptedClassifier {
    val_accuracies: Vec<f32>,
    epoch: Cell<usize>,
    train_loss: f32,
    compiled: bool,
}

impl ScriptedClassifier {
    fn new(val_accuracies: &[f32]) -> Self {
        Self {
            val_accuracies: val_accuracies.to_vec(),
            epoch: Cell::new(0),
            train_loss: 0.5,
            compiled: true,
        }
    }
}

impl Classifier for ScriptedClassifier {
    fn compile(&mut self, _options: CompileOptions) -> Result<(), ModelError> {
        self.compiled = true;
        Ok(())
    }

    fn is_compiled(&self) -> bool {
        self.compiled
    }

    fn train_epoch(
        &mut self,
        _train: &TensorDataset,
        _batch_size: usize,
        _seed: u64,
    ) -> Result<Evaluation, ModelError> {
        Ok(Evaluation {
            loss: self.train_loss,
            accuracy: 0.5,
        })
    }

    fn evaluate(
        &self,
        _data: &TensorDataset,
        _batch_size: usize,
    ) -> Result<Evaluation, ModelError> {
        let epoch = self.epoch.get();
        self.epoch.set(epoch + 1);
        Ok(Evaluation {
            loss: 1.0 - self.val_accuracies[epoch],
            accuracy: self.val_accuracies[epoch],
        })
    }

    fn predict(&self, inputs: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        Ok(Array2::zeros((inputs.len_of(ndarray::Axis(0)), 2)))
    }

    fn weights(&self) -> Vec<ArrayD<f32>> {
        vec![ArrayD::zeros(IxDyn(&[1]))]
    }
}

/// 两类、每类若干样本的小数据集，输入 [n, 2, 2, 1]
fn dataset(n: usize, num_classes: usize) -> TensorDataset {
    let mut features = Array4::<f32>::zeros((n, 2, 2, 1));
    let mut labels = Array2::<f32>::zeros((n, num_classes));
    for i in 0..n {
        let class = i % num_classes;
        features[[i, class % 2, class / 2 % 2, 0]] = 1.0;
        labels[[i, class]] = 1.0;
    }
    TensorDataset::new(features, labels).unwrap()
}

fn config(classes: &[u8], max_epochs: usize) -> TrainConfig {
    TrainConfig {
        classes: ClassSet::new(classes.to_vec()).unwrap(),
        seed: 12,
        batch_size: 4,
        max_epochs,
        patience: 3,
    }
}

#[test]
fn test_trainer_rejects_invalid_config() {
    let result = Trainer::new(TrainConfig {
        max_epochs: 0,
        ..TrainConfig::default()
    });
    assert!(matches!(
        result,
        Err(TrainError::Config(ConfigError::Invalid {
            field: "max_epochs",
            ..
        }))
    ));
}

#[test]
fn test_early_stop_on_plateau() {
    // [0.10, 0.20, 0.20, 0.20, 0.20, 0.90]，patience=3：第 5 轮后停止，0.90 永远不会出现
    let trainer = Trainer::new(config(&[3, 7], 6)).unwrap();
    let mut model = ScriptedClassifier::new(&[0.10, 0.20, 0.20, 0.20, 0.20, 0.90]);
    let data = dataset(8, 2);

    let history = trainer.train(&mut model, &data, &data).unwrap();

    assert_eq!(history.len(), 5);
    assert_eq!(history.stopped_epoch(), Some(4));
    assert_eq!(history.val_accuracy(), vec![0.10, 0.20, 0.20, 0.20, 0.20]);
    assert_eq!(model.epoch.get(), 5);
}

#[test]
fn test_runs_full_budget_while_improving() {
    let trainer = Trainer::new(config(&[3, 7], 4)).unwrap();
    let mut model = ScriptedClassifier::new(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    let data = dataset(8, 2);

    let history = trainer.train(&mut model, &data, &data).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history.stopped_epoch(), None);
    // 每条记录包含 4 个指标
    let last = history.last().unwrap();
    assert_eq!(last.epoch, 3);
    assert_eq!(last.loss, 0.5);
    assert_eq!(last.val_accuracy, 0.4);
}

#[test]
fn test_shape_mismatch_between_splits() {
    let trainer = Trainer::new(config(&[3, 7], 2)).unwrap();
    let mut model = ScriptedClassifier::new(&[0.1, 0.2]);
    let train = dataset(8, 2);
    let validation =
        TensorDataset::new(Array4::zeros((4, 3, 3, 1)), Array2::zeros((4, 2))).unwrap();

    let result = trainer.train(&mut model, &train, &validation);
    assert!(matches!(result, Err(TrainError::ShapeMismatch { .. })));
    // 校验失败时分类器未被调用
    assert_eq!(model.epoch.get(), 0);
}

#[test]
fn test_label_width_must_match_classes() {
    let trainer = Trainer::new(config(&[1, 2, 3], 2)).unwrap();
    let mut model = ScriptedClassifier::new(&[0.1, 0.2]);
    let data = dataset(8, 2);

    let result = trainer.train(&mut model, &data, &data);
    assert!(matches!(result, Err(TrainError::ShapeMismatch { .. })));
}

#[test]
fn test_empty_dataset() {
    let trainer = Trainer::new(config(&[3, 7], 2)).unwrap();
    let mut model = ScriptedClassifier::new(&[0.1, 0.2]);
    let empty = TensorDataset::new(Array4::zeros((0, 2, 2, 1)), Array2::zeros((0, 2))).unwrap();

    let result = trainer.train(&mut model, &empty, &dataset(4, 2));
    assert!(matches!(result, Err(TrainError::EmptyDataset(_))));
    let result = trainer.train(&mut model, &dataset(4, 2), &empty);
    assert!(matches!(result, Err(TrainError::EmptyDataset(_))));
}

#[test]
fn test_classifier_errors_propagate() {
    let trainer = Trainer::new(config(&[3, 7], 3)).unwrap();
    let data = dataset(8, 2);

    let mut uncompiled = ScriptedClassifier::new(&[0.1, 0.2, 0.3]);
    uncompiled.compiled = false;
    let result = trainer.train(&mut uncompiled, &data, &data);
    assert!(matches!(result, Err(TrainError::Model(ModelError::NotCompiled))));

    let mut diverging = ScriptedClassifier::new(&[0.1, 0.2, 0.3]);
    diverging.train_loss = f32::NAN;
    let result = trainer.train(&mut diverging, &data, &data);
    assert!(matches!(
        result,
        Err(TrainError::Model(ModelError::Diverged { epoch: 0, .. }))
    ));
}

#[test]
fn test_extra_callbacks_are_notified() {
    struct StopAfter(usize);
    impl Callback for StopAfter {
        fn on_epoch_end(&mut self, record: &EpochRecord) -> CallbackAction {
            if record.epoch + 1 >= self.0 {
                CallbackAction::Stop
            } else {
                CallbackAction::Continue
            }
        }
    }

    let trainer = Trainer::new(config(&[3, 7], 10)).unwrap();
    let mut model = ScriptedClassifier::new(&[0.1, 0.2, 0.3, 0.4, 0.5]);
    let data = dataset(8, 2);

    let history = trainer
        .train_with_callbacks(&mut model, &data, &data, &mut [&mut StopAfter(2)])
        .unwrap();
    assert_eq!(history.len(), 2);
    // 由其他回调停止时早停轮次为空
    assert_eq!(history.stopped_epoch(), None);
}

#[test]
fn test_training_is_deterministic() {
    let classes = ClassSet::new(vec![1, 3]).unwrap();
    let images = ndarray::Array3::from_shape_fn((24, 4, 4), |(i, r, c)| {
        ((i * 37 + r * 11 + c * 5) % 256) as u8
    });
    let labels = ndarray::Array1::from_shape_fn(24, |i| [1u8, 2, 3][i % 3]);
    let source = InMemorySource::from_arrays(images.clone(), labels.clone(), images, labels, 10)
        .unwrap();
    let (train, test) = load_data(&source, &classes).unwrap();
    let train = TensorDataset::from_raw(&train, &classes).unwrap();
    let test = TensorDataset::from_raw(&test, &classes).unwrap();

    let trainer = Trainer::new(TrainConfig {
        classes,
        seed: 12,
        batch_size: 5,
        max_epochs: 6,
        patience: 3,
    })
    .unwrap();

    let run = || {
        let mut model = DenseClassifier::new(train.sample_shape(), 8, 2, 12).unwrap();
        model
            .compile(CompileOptions {
                optimizer: OptimizerKind::from(SGD::new(0.1)),
                ..CompileOptions::default()
            })
            .unwrap();
        trainer.train(&mut model, &train, &test).unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.val_accuracy(), second.val_accuracy());
    assert_eq!(first, second);
}
