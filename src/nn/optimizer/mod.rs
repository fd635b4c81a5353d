/*
 * @Author       : 老董
 * @Date         : 2026-02-12
 * @Description  : 优化器模块，实现 SGD 与 Adam
 */

mod adam;
mod base;
mod sgd;

pub use adam::Adam;
pub use base::{Optimizer, OptimizerKind};
pub use sgd::SGD;
