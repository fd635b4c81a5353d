/*
 * @Author       : 老董
 * @Date         : 2026-02-14
 * @Description  : DenseClassifier 模型 I/O（save_model/load_model/export_weights_npy）
 *
 * 保存时生成两个文件：
 * - `{path}.json`: 模型结构描述（可读）
 * - `{path}.bin`: 参数数据（bincode）
 */

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::dense::DenseClassifier;
use super::error::ModelError;

/// 描述符格式版本
const DESCRIPTOR_VERSION: &str = "1";

/// 模型结构描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 模型类型
    pub kind: String,
    pub input_shape: [usize; 3],
    pub hidden_units: usize,
    pub num_classes: usize,
    /// 与 weights() 顺序一致的参数形状
    pub param_shapes: Vec<Vec<usize>>,
    /// 参数文件名（相对于 JSON 文件）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params_file: Option<String>,
}

impl ModelDescriptor {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl DenseClassifier {
    /// 当前模型的结构描述
    pub fn describe(&self) -> ModelDescriptor {
        ModelDescriptor {
            version: DESCRIPTOR_VERSION.to_string(),
            kind: "dense".to_string(),
            input_shape: self.input_shape(),
            hidden_units: self.hidden_units(),
            num_classes: self.num_classes(),
            param_shapes: self.weight_shapes(),
            params_file: None,
        }
    }

    /// 保存完整模型（结构 JSON + 参数 bin）
    ///
    /// # 示例
    /// ```ignore
    /// model.save_model("models/mnist")?;
    /// // 生成：models/mnist.json + models/mnist.bin
    /// ```
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let json_path = path.with_extension("json");
        let bin_path = path.with_extension("bin");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&bin_path)?);
        bincode::serialize_into(&mut writer, &self.weights())
            .map_err(|e| ModelError::Serialization(format!("写入参数失败: {e}")))?;
        writer.flush()?;

        let mut descriptor = self.describe();
        descriptor.params_file = Some(bin_path.file_name().map_or_else(
            || "params.bin".to_string(),
            |s| s.to_string_lossy().to_string(),
        ));
        let json = descriptor
            .to_json()
            .map_err(|e| ModelError::Serialization(format!("序列化模型描述失败: {e}")))?;
        std::fs::write(&json_path, json)?;

        tracing::info!(json = %json_path.display(), params = %bin_path.display(), "模型已保存");
        Ok(())
    }

    /// 从 `{path}.json` + 参数文件重建模型（未编译状态）
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path.with_extension("json"))?;
        let descriptor = ModelDescriptor::from_json(&json)
            .map_err(|e| ModelError::Serialization(format!("解析模型描述失败: {e}")))?;
        if descriptor.kind != "dense" {
            return Err(ModelError::InvalidOperation(format!(
                "不支持的模型类型: {}",
                descriptor.kind
            )));
        }

        let bin_path = match descriptor.params_file {
            Some(ref params_file) => path
                .parent()
                .map_or_else(|| PathBuf::from(params_file), |p| p.join(params_file)),
            None => path.with_extension("bin"),
        };
        let reader = BufReader::new(File::open(&bin_path)?);
        let weights: Vec<ArrayD<f32>> = bincode::deserialize_from(reader)
            .map_err(|e| ModelError::Serialization(format!("读取参数失败: {e}")))?;

        // 种子不影响结果，参数随即被覆盖
        let mut model = Self::new(
            descriptor.input_shape,
            descriptor.hidden_units,
            descriptor.num_classes,
            0,
        )?;
        model.set_weights(weights)?;
        Ok(model)
    }
}

/// 将每个参数写成 `weight_{i}.npy`，返回写出的文件路径
pub fn export_weights_npy<C, P>(model: &C, dir: P) -> Result<Vec<PathBuf>, ModelError>
where
    C: Classifier + ?Sized,
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::new();
    for (i, weight) in model.weights().iter().enumerate() {
        let path = dir.join(format!("weight_{i}.npy"));
        ndarray_npy::write_npy(&path, weight)?;
        paths.push(path);
    }
    tracing::info!(dir = %dir.display(), count = paths.len(), "权重已导出");
    Ok(paths)
}
