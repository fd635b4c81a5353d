/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-14
 * @Description  : 负责分类器（classifier）的构建、训练与持久化
 */

mod callback;
mod classifier;
mod dense;
mod error;
mod history;
mod init;
pub mod loss;
mod model_io;
pub mod optimizer;

pub use callback::{Callback, CallbackAction, EarlyStopping, EarlyStoppingState, Monitor};
pub use classifier::{Classifier, CompileOptions, Evaluation, FitOptions};
pub use dense::DenseClassifier;
pub use error::ModelError;
pub use history::{EpochRecord, History};
pub use init::Init;
pub use loss::{Loss, Metric};
pub use model_io::{ModelDescriptor, export_weights_npy};
pub use optimizer::{Adam, Optimizer, OptimizerKind, SGD};

#[cfg(test)]
mod tests;
