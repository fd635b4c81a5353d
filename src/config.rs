/*
 * @Author       : 老董
 * @Date         : 2026-02-14
 * @Description  : 训练与演示程序的配置
 *
 * 所有配置在构造后不可变，显式传给各组件；JSON 中缺省的字段取默认值。
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::ClassSet;
use crate::nn::{Adam, OptimizerKind, SGD};

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path} 失败: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("解析配置失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 字段取值非法
    #[error("无效的配置 {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// 一次训练运行的配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// 参与训练的类别（顺序决定重编号）
    pub classes: ClassSet,
    pub seed: u64,
    pub batch_size: usize,
    pub max_epochs: usize,
    /// 早停耐心值
    pub patience: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            classes: ClassSet::digits(),
            seed: 12,
            batch_size: 128,
            max_epochs: 20,
            patience: 3,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("batch_size", self.batch_size),
            ("max_epochs", self.max_epochs),
            ("patience", self.patience),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    message: "必须大于 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// 数据源配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// MNIST 文件所在目录，None 使用默认缓存目录
    pub root: Option<PathBuf>,
    /// 缺失时是否下载
    pub download: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: None,
            download: true,
        }
    }
}

/// 分类器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub hidden_units: usize,
    pub learning_rate: f32,
    /// "adam" 或 "sgd"
    pub optimizer: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_units: 128,
            learning_rate: 1e-3,
            optimizer: "adam".to_string(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hidden_units == 0 {
            return Err(ConfigError::Invalid {
                field: "hidden_units",
                message: "必须大于 0".to_string(),
            });
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ConfigError::Invalid {
                field: "learning_rate",
                message: format!("必须为正数，实际 {}", self.learning_rate),
            });
        }
        self.build_optimizer().map(|_| ())
    }

    /// 按名称构造优化器
    pub fn build_optimizer(&self) -> Result<OptimizerKind, ConfigError> {
        match self.optimizer.to_ascii_lowercase().as_str() {
            "adam" => Ok(Adam::new_default(self.learning_rate).into()),
            "sgd" => Ok(SGD::new(self.learning_rate).into()),
            other => Err(ConfigError::Invalid {
                field: "optimizer",
                message: format!("未知的优化器 {other:?}（可选 adam / sgd）"),
            }),
        }
    }
}

/// 演示程序的完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub train: TrainConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    /// 训练后保存模型的路径（不含扩展名）
    pub save_path: Option<PathBuf>,
    /// 导出 .npy 权重的目录
    pub export_weights_dir: Option<PathBuf>,
}

impl AppConfig {
    /// 从 JSON 文件加载并校验
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.train.validate()?;
        self.model.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_config_defaults() {
        let config = TrainConfig::default();
        assert_eq!(config.classes.labels(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(config.seed, 12);
        assert_eq!(config.batch_size, 128);
        assert_eq!(config.max_epochs, 20);
        assert_eq!(config.patience, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_train_config_rejects_zero() {
        let config = TrainConfig {
            batch_size: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "batch_size",
                ..
            })
        ));

        let config = TrainConfig {
            patience: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "patience", .. })
        ));
    }

    #[test]
    fn test_app_config_partial_json() {
        let json = r#"{
            "train": { "classes": [3, 7], "max_epochs": 5 },
            "model": { "optimizer": "sgd", "learning_rate": 0.1 },
            "save_path": "models/mnist"
        }"#;
        let config = AppConfig::from_json_str(json).unwrap();

        assert_eq!(config.train.classes.labels(), &[3, 7]);
        assert_eq!(config.train.max_epochs, 5);
        assert_eq!(config.train.batch_size, 128);
        assert_eq!(config.model.hidden_units, 128);
        assert!(matches!(config.model.build_optimizer(), Ok(OptimizerKind::SGD(_))));
        assert!(config.data.download);
        assert_eq!(config.save_path, Some(PathBuf::from("models/mnist")));
        assert_eq!(config.export_weights_dir, None);
    }

    #[test]
    fn test_app_config_invalid_values() {
        // 空类别集合在反序列化阶段即被拒绝
        let result = AppConfig::from_json_str(r#"{ "train": { "classes": [] } }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = AppConfig::from_json_str(r#"{ "model": { "optimizer": "rmsprop" } }"#);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "optimizer",
                ..
            })
        ));

        let result = AppConfig::from_json_str(r#"{ "unknown": 1 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_app_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "train": { "seed": 7 } }"#).unwrap();
        assert_eq!(AppConfig::from_json_file(&path).unwrap().train.seed, 7);

        let missing = AppConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
