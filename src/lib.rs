//! # MNIST Trainer
//!
//! `mnist_trainer` 是一个手写数字分类的完整训练流程：
//! 从 MNIST 数据源加载并按类别筛选样本，做归一化与 one-hot 编码，
//! 再由训练编排器驱动分类器训练，以验证准确率为指标进行早停。
//!
//! - [`data`]: 数据源、类别筛选、预处理与批处理
//! - [`nn`]: 分类器抽象、两层全连接分类器、优化器、回调与模型持久化
//! - [`train`]: 训练编排器
//! - [`config`]: 训练与演示程序配置
//! - [`logging`]: 日志初始化
//!

pub mod config;
pub mod data;
pub mod logging;
pub mod nn;
pub mod train;
