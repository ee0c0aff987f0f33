//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 分组器配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrouperConfig {
    /// 规则定义文件（JSON）
    pub rules_path: String,
    /// 覆盖规则定义中的 enabled 开关
    pub enabled: Option<bool>,
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self {
            rules_path: "config/rules.json".to_string(),
            enabled: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub grouper: GrouperConfig,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "coalesce".to_string(),
            environment: "development".to_string(),
            grouper: GrouperConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（COALESCE_ 前缀，如 COALESCE_GROUPER__RULES_PATH -> grouper.rules_path）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("COALESCE_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(Path::new(&config_dir), service_name, &env)
    }

    fn load_from(config_dir: &Path, service_name: &str, env: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            // 环境变量覆盖（COALESCE_GROUPER__RULES_PATH -> grouper.rules_path）
            .add_source(
                Environment::with_prefix("COALESCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service_name, "coalesce");
        assert_eq!(config.grouper.rules_path, "config/rules.json");
        assert!(config.grouper.enabled.is_none());
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.is_production());
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let dir = std::env::temp_dir().join("coalesce-config-test-empty");
        let config = AppConfig::load_from(&dir, "coalesce", "test").unwrap();

        assert_eq!(config.service_name, "coalesce");
        assert_eq!(config.environment, "test");
        assert_eq!(config.grouper.rules_path, "config/rules.json");
    }

    #[test]
    fn test_service_file_overrides_default_file() {
        let dir = std::env::temp_dir().join("coalesce-config-test-layered");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("default.toml"),
            "[grouper]\nrules_path = \"default-rules.json\"\n\n[observability]\nlog_level = \"debug\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("coalesce.toml"),
            "[grouper]\nrules_path = \"service-rules.json\"\nenabled = false\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir, "coalesce", "staging").unwrap();

        assert_eq!(config.grouper.rules_path, "service-rules.json");
        assert_eq!(config.grouper.enabled, Some(false));
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "pretty");

        fs::remove_dir_all(&dir).unwrap();
    }
}
