/*
 * @Author       : 老董
 * @Date         : 2026-02-14
 * @Description  : MNIST 训练流程演示
 *
 * 用法：mnist_walkthrough [config.json]
 *
 * 依次执行：加载 → 预览原始数据 → 预处理 → 预览预处理结果 → 构建模型 →
 * 编译 → 训练 → 查看权重 → 查看预测 → 保存。
 * 每一步以带 `step` 字段的 info 日志标记，不等待任何交互输入。
 */

use std::process::ExitCode;

use mnist_trainer::config::{AppConfig, ConfigError};
use mnist_trainer::data::transforms::decode_predictions;
use mnist_trainer::data::{DataError, MnistSource, TensorDataset, default_data_dir, load_data};
use mnist_trainer::logging::{self, LoggingError};
use mnist_trainer::nn::{
    Classifier, CompileOptions, DenseClassifier, Loss, Metric, ModelError, export_weights_npy,
};
use mnist_trainer::train::{TrainError, Trainer};
use ndarray::s;
use thiserror::Error;
use tracing::{error, info};

/// 预测预览的样本数
const PREVIEW_SAMPLES: usize = 8;

#[derive(Debug, Error)]
enum WalkthroughError {
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Train(#[from] TrainError),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "演示程序失败");
            eprintln!("错误: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), WalkthroughError> {
    logging::init()?;

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    let classes = &config.train.classes;

    // ========== 1. 加载数据 ==========
    info!(step = 1, "加载数据集");
    let source = MnistSource::new(config.data.root.as_deref(), config.data.download);
    info!(root = %source.root().display(), default_root = %default_data_dir().display(), "数据目录");
    let (train_split, test_split) = load_data(&source, classes)?;
    info!(
        step = 1,
        train_images = ?train_split.images().shape(),
        train_labels = ?train_split.labels().shape(),
        test_images = ?test_split.images().shape(),
        "数据集已加载"
    );

    // ========== 2. 预览原始数据 ==========
    let counts = train_split.label_counts();
    for &label in classes.labels() {
        let samples = counts.get(usize::from(label)).copied().unwrap_or(0);
        info!(step = 2, label, samples, "训练集类别分布");
    }
    let (first_image, first_label) = train_split.get(0)?;
    info!(
        step = 2,
        label = first_label,
        max_pixel = first_image.iter().copied().max().unwrap_or(0),
        "第一个训练样本"
    );

    // ========== 3. 预处理 ==========
    let train = TensorDataset::from_raw(&train_split, classes)?;
    let test = TensorDataset::from_raw(&test_split, classes)?;
    info!(
        step = 3,
        x_train = ?train.features().shape(),
        y_train = ?train.labels().shape(),
        x_test = ?test.features().shape(),
        y_test = ?test.labels().shape(),
        "数据已预处理"
    );

    // ========== 4. 预览预处理结果 ==========
    // 原始标签保持不变，可以与 one-hot 行对照
    let first_row = train.labels().row(0);
    info!(
        step = 4,
        raw_label = train_split.labels()[0],
        one_hot = ?first_row.to_vec(),
        pixel_range = ?(
            train.features().fold(f32::INFINITY, |m, &v| m.min(v)),
            train.features().fold(f32::NEG_INFINITY, |m, &v| m.max(v))
        ),
        "预处理结果"
    );

    // ========== 5. 构建模型 ==========
    let mut model = DenseClassifier::new(
        train.sample_shape(),
        config.model.hidden_units,
        classes.len(),
        config.train.seed,
    )?;
    info!(step = 5, "模型结构:\n{}", model.summary());

    // ========== 6. 编译 ==========
    model.compile(CompileOptions {
        loss: Loss::CategoricalCrossentropy,
        optimizer: config.model.build_optimizer()?,
        metrics: vec![Metric::Accuracy],
    })?;
    info!(
        step = 6,
        optimizer = %config.model.optimizer,
        learning_rate = config.model.learning_rate,
        "模型已编译"
    );

    // ========== 7. 训练 ==========
    let trainer = Trainer::new(config.train.clone())?;
    let history = trainer.train(&mut model, &train, &test)?;
    for record in history.records() {
        info!(
            step = 7,
            epoch = record.epoch + 1,
            loss = record.loss,
            accuracy = record.accuracy,
            val_loss = record.val_loss,
            val_accuracy = record.val_accuracy,
            "训练历史"
        );
    }

    // ========== 8. 查看权重 ==========
    for (i, weight) in model.weights().iter().enumerate() {
        info!(step = 8, index = i, shape = ?weight.shape(), "权重");
    }
    if let Some(dir) = &config.export_weights_dir {
        export_weights_npy(&model, dir)?;
    }

    // ========== 9. 查看预测 ==========
    let n = test.len().min(PREVIEW_SAMPLES);
    let inputs = test.features().slice(s![..n, .., .., ..]).to_owned();
    let predicted = decode_predictions(&model.predict(&inputs)?, classes)?;
    let expected: Vec<u8> = test_split
        .labels()
        .slice(s![..n])
        .iter()
        .copied()
        .collect();
    info!(step = 9, ?predicted, ?expected, "测试集前几个样本的预测");
    let correct = predicted.iter().zip(&expected).filter(|(p, e)| p == e).count();
    info!(step = 9, correct, total = n, "预览样本预测正确数");

    // ========== 10. 保存 ==========
    match &config.save_path {
        Some(path) => model.save_model(path)?,
        None => info!(step = 10, "未配置 save_path，跳过保存"),
    }

    info!("演示完成");
    Ok(())
}
