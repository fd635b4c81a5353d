/*
 * @Author       : 老董
 * @Date         : 2026-02-13
 * @Description  : 两层全连接分类器
 *
 * 结构：Flatten → Linear(D, H) → ReLU → Linear(H, C) → Softmax
 * 权重 [in_features, out_features]，偏置 [out_features]；
 * 前向与反向传播直接在 ndarray 上手写。
 */

use ndarray::{Array1, Array2, Array4, ArrayD, Axis, Ix1, Ix2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::classifier::{Classifier, CompileOptions, Evaluation};
use super::error::ModelError;
use super::init::Init;
use super::loss::{Loss, Metric, count_correct, softmax};
use super::optimizer::{Optimizer, OptimizerKind};
use crate::data::transforms::flatten_images;
use crate::data::{DataLoader, TensorDataset};

/// compile 之后才存在的训练状态
#[derive(Debug, Clone)]
struct Compiled {
    loss: Loss,
    optimizer: OptimizerKind,
    metrics: Vec<Metric>,
}

/// 一次前向传播的中间结果（反向传播需要）
struct ForwardCache {
    inputs: Array2<f32>,
    hidden_pre: Array2<f32>,
    hidden: Array2<f32>,
    probs: Array2<f32>,
}

/// 两层全连接分类器
///
/// # 使用示例
/// ```ignore
/// let mut model = DenseClassifier::new([28, 28, 1], 128, classes.len(), 12)?;
/// model.compile(CompileOptions::default())?;
/// let history = model.fit(&train, &test, &options, &mut [&mut early_stopping])?;
/// ```
#[derive(Debug, Clone)]
pub struct DenseClassifier {
    input_shape: [usize; 3],
    hidden_units: usize,
    num_classes: usize,
    /// 第一层权重 [D, H]
    w1: Array2<f32>,
    b1: Array1<f32>,
    /// 第二层权重 [H, C]
    w2: Array2<f32>,
    b2: Array1<f32>,
    compiled: Option<Compiled>,
}

impl DenseClassifier {
    /// 创建并初始化分类器
    ///
    /// 同一 `seed` 总是得到相同的初始权重：第一层 Kaiming，第二层 Xavier，偏置为零。
    pub fn new(
        input_shape: [usize; 3],
        hidden_units: usize,
        num_classes: usize,
        seed: u64,
    ) -> Result<Self, ModelError> {
        if input_shape.contains(&0) || hidden_units == 0 || num_classes == 0 {
            return Err(ModelError::InvalidOperation(format!(
                "无效的模型尺寸: input_shape={input_shape:?}, \
                 hidden_units={hidden_units}, num_classes={num_classes}"
            )));
        }
        let in_features: usize = input_shape.iter().product();
        let mut rng = StdRng::seed_from_u64(seed);
        let w1 = Init::Kaiming.generate((in_features, hidden_units), &mut rng);
        let w2 = Init::Xavier.generate((hidden_units, num_classes), &mut rng);

        Ok(Self {
            input_shape,
            hidden_units,
            num_classes,
            w1,
            b1: Array1::zeros(hidden_units),
            w2,
            b2: Array1::zeros(num_classes),
            compiled: None,
        })
    }

    pub fn input_shape(&self) -> [usize; 3] {
        self.input_shape
    }

    pub fn in_features(&self) -> usize {
        self.input_shape.iter().product()
    }

    pub fn hidden_units(&self) -> usize {
        self.hidden_units
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// 编译时选择的指标（未编译时为空）
    pub fn metrics(&self) -> &[Metric] {
        self.compiled
            .as_ref()
            .map(|c| c.metrics.as_slice())
            .unwrap_or(&[])
    }

    /// 形状与 [`Classifier::weights`] 的顺序一致
    pub fn weight_shapes(&self) -> Vec<Vec<usize>> {
        vec![
            self.w1.shape().to_vec(),
            self.b1.shape().to_vec(),
            self.w2.shape().to_vec(),
            self.b2.shape().to_vec(),
        ]
    }

    /// 用给定参数替换当前权重（顺序同 [`Classifier::weights`]）
    pub fn set_weights(&mut self, weights: Vec<ArrayD<f32>>) -> Result<(), ModelError> {
        let expected = self.weight_shapes();
        let got: Vec<Vec<usize>> = weights.iter().map(|w| w.shape().to_vec()).collect();
        if expected != got {
            return Err(ModelError::ShapeMismatch {
                expected: expected.concat(),
                got: got.concat(),
                message: "参数形状与模型结构不一致".to_string(),
            });
        }

        let mut iter = weights.into_iter();
        let mut next = || {
            iter.next()
                .ok_or_else(|| ModelError::InvalidOperation("参数数量不足".to_string()))
        };
        let w1 = next()?.into_dimensionality::<Ix2>().map_err(shape_error)?;
        let b1 = next()?.into_dimensionality::<Ix1>().map_err(shape_error)?;
        let w2 = next()?.into_dimensionality::<Ix2>().map_err(shape_error)?;
        let b2 = next()?.into_dimensionality::<Ix1>().map_err(shape_error)?;

        self.w1 = w1;
        self.b1 = b1;
        self.w2 = w2;
        self.b2 = b2;
        Ok(())
    }

    /// 检查一批输入的样本形状
    fn check_inputs(&self, inputs: &Array4<f32>) -> Result<(), ModelError> {
        let (n, h, w, c) = inputs.dim();
        if [h, w, c] != self.input_shape {
            return Err(ModelError::ShapeMismatch {
                expected: vec![n, self.input_shape[0], self.input_shape[1], self.input_shape[2]],
                got: inputs.shape().to_vec(),
                message: "输入形状与模型不一致".to_string(),
            });
        }
        Ok(())
    }

    /// 检查数据集的样本形状与标签宽度
    fn check_dataset(&self, data: &TensorDataset) -> Result<(), ModelError> {
        self.check_inputs(data.features())?;
        if data.num_classes() != self.num_classes {
            return Err(ModelError::ShapeMismatch {
                expected: vec![data.len(), self.num_classes],
                got: data.labels().shape().to_vec(),
                message: "标签宽度与类别数不一致".to_string(),
            });
        }
        if data.is_empty() {
            return Err(ModelError::InvalidOperation("数据集为空".to_string()));
        }
        Ok(())
    }

    fn compiled(&self) -> Result<&Compiled, ModelError> {
        self.compiled.as_ref().ok_or(ModelError::NotCompiled)
    }

    fn forward(&self, inputs: &Array4<f32>) -> Result<ForwardCache, ModelError> {
        let inputs = flatten_images(inputs)?;
        let hidden_pre = inputs.dot(&self.w1) + &self.b1;
        let hidden = hidden_pre.mapv(|v| v.max(0.0));
        let logits = hidden.dot(&self.w2) + &self.b2;
        let probs = softmax(&logits);
        Ok(ForwardCache {
            inputs,
            hidden_pre,
            hidden,
            probs,
        })
    }

    /// 反向传播，梯度顺序同 [`Classifier::weights`]
    fn backward(&self, cache: &ForwardCache, labels: &Array2<f32>, loss: Loss) -> Vec<ArrayD<f32>> {
        let grad_logits = loss.grad_logits(&cache.probs, labels);
        let grad_w2 = cache.hidden.t().dot(&grad_logits);
        let grad_b2 = grad_logits.sum_axis(Axis(0));

        // ReLU 的导数：pre > 0 处为 1
        let mut grad_hidden = grad_logits.dot(&self.w2.t());
        grad_hidden.zip_mut_with(&cache.hidden_pre, |g, &pre| {
            if pre <= 0.0 {
                *g = 0.0;
            }
        });
        let grad_w1 = cache.inputs.t().dot(&grad_hidden);
        let grad_b1 = grad_hidden.sum_axis(Axis(0));

        vec![
            grad_w1.into_dyn(),
            grad_b1.into_dyn(),
            grad_w2.into_dyn(),
            grad_b2.into_dyn(),
        ]
    }
}

fn shape_error(e: ndarray::ShapeError) -> ModelError {
    ModelError::InvalidOperation(format!("参数维度错误: {e}"))
}

impl Classifier for DenseClassifier {
    fn compile(&mut self, options: CompileOptions) -> Result<(), ModelError> {
        let CompileOptions {
            loss,
            mut optimizer,
            metrics,
        } = options;
        optimizer.reset();
        self.compiled = Some(Compiled {
            loss,
            optimizer,
            metrics,
        });
        Ok(())
    }

    fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    fn train_epoch(
        &mut self,
        train: &TensorDataset,
        batch_size: usize,
        seed: u64,
    ) -> Result<Evaluation, ModelError> {
        self.check_dataset(train)?;
        let loss_fn = self.compiled()?.loss;

        let loader = DataLoader::new(train, batch_size).shuffle(true).seed(seed);
        let mut total_loss = 0.0f32;
        let mut correct = 0usize;
        for (step, (x_batch, y_batch)) in loader.iter().enumerate() {
            let cache = self.forward(&x_batch)?;
            let batch_loss = loss_fn.compute(&cache.probs, &y_batch);
            total_loss += batch_loss * y_batch.nrows() as f32;
            correct += count_correct(&cache.probs, &y_batch);

            let grads = self.backward(&cache, &y_batch, loss_fn);
            let Self {
                w1,
                b1,
                w2,
                b2,
                compiled,
                ..
            } = &mut *self;
            let compiled = compiled.as_mut().ok_or(ModelError::NotCompiled)?;
            let mut params = [
                w1.view_mut().into_dyn(),
                b1.view_mut().into_dyn(),
                w2.view_mut().into_dyn(),
                b2.view_mut().into_dyn(),
            ];
            compiled.optimizer.step(&mut params, &grads)?;
            tracing::debug!(step, loss = batch_loss, "batch 完成");
        }

        let n = train.len() as f32;
        Ok(Evaluation {
            loss: total_loss / n,
            accuracy: correct as f32 / n,
        })
    }

    fn evaluate(&self, data: &TensorDataset, batch_size: usize) -> Result<Evaluation, ModelError> {
        self.check_dataset(data)?;
        let loss_fn = self.compiled()?.loss;

        let mut total_loss = 0.0f32;
        let mut correct = 0usize;
        for (x_batch, y_batch) in DataLoader::new(data, batch_size).iter() {
            let probs = self.forward(&x_batch)?.probs;
            total_loss += loss_fn.compute(&probs, &y_batch) * y_batch.nrows() as f32;
            correct += count_correct(&probs, &y_batch);
        }

        let n = data.len() as f32;
        Ok(Evaluation {
            loss: total_loss / n,
            accuracy: correct as f32 / n,
        })
    }

    fn predict(&self, inputs: &Array4<f32>) -> Result<Array2<f32>, ModelError> {
        self.check_inputs(inputs)?;
        Ok(self.forward(inputs)?.probs)
    }

    fn weights(&self) -> Vec<ArrayD<f32>> {
        vec![
            self.w1.clone().into_dyn(),
            self.b1.clone().into_dyn(),
            self.w2.clone().into_dyn(),
            self.b2.clone().into_dyn(),
        ]
    }

    fn summary(&self) -> String {
        let rows = [
            ("flatten", vec![self.in_features()], 0),
            ("dense_1 (relu)", vec![self.hidden_units], self.w1.len() + self.b1.len()),
            ("dense_2 (softmax)", vec![self.num_classes], self.w2.len() + self.b2.len()),
        ];
        let mut lines = vec![format!("{:<20}{:<16}{:>10}", "Layer", "Output Shape", "Params")];
        for (name, shape, params) in &rows {
            lines.push(format!("{:<20}{:<16}{:>10}", name, format!("{shape:?}"), params));
        }
        let total: usize = rows.iter().map(|(_, _, p)| p).sum();
        lines.push(format!("Total params: {total}"));
        lines.join("\n")
    }
}
