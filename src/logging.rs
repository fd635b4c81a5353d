//! 日志初始化
//!
//! 库代码只发出 `tracing` 事件；由可执行程序调用 [`init`] 安装输出到 stdout 的订阅者。
//! 过滤级别默认为 `info`，可通过 `RUST_LOG` 覆盖（如 `RUST_LOG=mnist_trainer=debug`）。

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info";

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// 日志初始化错误
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// 全局订阅者已被其他代码设置
    #[error("无法设置全局 tracing 订阅者: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// 安装全局 tracing 订阅者
///
/// 重复调用为空操作。
pub fn init() -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt::layer().with_target(false))
        .try_init()?;
    let _ = INITIALIZED.set(());

    tracing::debug!("日志已初始化");
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
