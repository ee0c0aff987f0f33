//! 统一可观测性模块
//!
//! 提供日志的统一初始化和管理，所有二进制通过单一入口点配置。

pub mod tracing;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 服务名称，用于标识日志来源
    pub service_name: String,

    /// 日志级别（如 "info", "debug"），RUST_LOG 优先
    pub log_level: String,

    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "coalesce".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// 注入服务名
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// 可观测性资源守卫
///
/// 在 Drop 时记录关闭日志。
pub struct ObservabilityGuard {
    service_name: String,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!(service = %self.service_name, "Shutting down observability...");
    }
}

/// 统一初始化可观测性
///
/// # Example
///
/// ```ignore
/// use coalesce_shared::observability::{init, ObservabilityConfig};
///
/// fn main() -> anyhow::Result<()> {
///     let config = ObservabilityConfig::default().with_service_name("coalesce");
///     let _guard = init(&config)?;
///
///     // 应用逻辑...
///
///     Ok(())
/// }
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    info!(
        service = %config.service_name,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        service_name: config.service_name.clone(),
    })
}
