//! 可观测性模块
//!
//! 统一初始化日志输出。指标只通过 `metrics` 门面记录，
//! 是否安装导出器由宿主应用决定。

pub mod tracing;

use crate::config::ObservabilityConfig;
use ::tracing::info;
use anyhow::Result;

/// 初始化可观测性
///
/// 同一进程只能初始化一次，重复调用返回错误。
///
/// ```ignore
/// let config = AppConfig::load("rule-matcher")?;
/// matcher_shared::observability::init(&config.observability)?;
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;

    info!(
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}
