//! 配置管理模块
//!
//! 支持多层配置文件加载和环境变量覆盖。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 引擎配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JSON 引擎定义文件路径
    pub definition_path: Option<PathBuf>,
    /// 覆盖定义文件中的索引开关，未设置时沿用定义文件
    pub index_enabled: Option<bool>,
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. {CONFIG_DIR}/default.toml
    /// 2. {CONFIG_DIR}/{MATCHER_ENV}.toml
    /// 3. {CONFIG_DIR}/{service_name}.toml
    /// 4. 环境变量（MATCHER_ 前缀，层级用双下划线，如 MATCHER_ENGINE__INDEX_ENABLED -> engine.index_enabled）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        Self::load_from(config_dir, service_name)
    }

    /// 从指定目录加载配置
    pub fn load_from(config_dir: impl AsRef<Path>, service_name: &str) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let env = std::env::var("MATCHER_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("MATCHER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("matcher-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
        assert!(config.engine.definition_path.is_none());
    }

    #[test]
    fn test_load_without_files() {
        let dir = temp_config_dir("empty");
        let config = AppConfig::load_from(&dir, "rule-matcher").unwrap();

        assert_eq!(config.service_name, "rule-matcher");
        assert_eq!(config.observability.log_level, "info");
        assert!(config.engine.index_enabled.is_none());
    }

    #[test]
    fn test_service_file_overrides_default() {
        let dir = temp_config_dir("layered");
        fs::write(
            dir.join("default.toml"),
            "[engine]\ndefinition_path = \"rules/default.json\"\n\n[observability]\nlog_level = \"warn\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("rule-matcher.toml"),
            "[engine]\nindex_enabled = true\n\n[observability]\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&dir, "rule-matcher").unwrap();

        assert_eq!(
            config.engine.definition_path,
            Some(PathBuf::from("rules/default.json"))
        );
        assert_eq!(config.engine.index_enabled, Some(true));
        assert_eq!(config.observability.log_level, "debug");
    }
}
