// ==========================================
// 细纱质量分析系统 - 服务配置
// ==========================================
// 来源: 环境变量（未设置或格式错误时使用默认值）
// ==========================================

use crate::cache::refresher::RefresherOptions;
use crate::engine::aggregation::DEFAULT_MIN_YARN_LENGTH;
use std::path::PathBuf;
use std::time::Duration;

/// 环境变量名
pub mod env_keys {
    pub const BIND_ADDR: &str = "SQC_BIND_ADDR";
    pub const BLOB_DIR: &str = "SQC_BLOB_DIR";
    pub const BLOB_URL: &str = "SQC_BLOB_URL";
    pub const BLOB_TOKEN: &str = "SQC_BLOB_TOKEN";
    pub const BLOB_EXT: &str = "SQC_BLOB_EXT";
    pub const REFRESH_INTERVAL_MINUTES: &str = "SQC_REFRESH_INTERVAL_MINUTES";
    pub const UNIT_TIMEOUT_SECS: &str = "SQC_UNIT_TIMEOUT_SECS";
    pub const MAX_STALENESS_MINUTES: &str = "SQC_MAX_STALENESS_MINUTES";
    pub const MIN_YARN_LENGTH: &str = "SQC_MIN_YARN_LENGTH";
    pub const LOG_FORMAT: &str = "SQC_LOG_FORMAT";
}

/// Blob 数据源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobSource {
    /// 本地目录
    Directory(PathBuf),
    /// HTTP(S) 容器地址 + 可选访问令牌
    Http { base_url: String, token: Option<String> },
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub blob_source: BlobSource,
    pub blob_extension: String,
    pub refresh_interval: Duration,
    pub unit_timeout: Duration,
    /// 0 表示不检查
    pub max_staleness_minutes: u64,
    pub min_yarn_length: f64,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            blob_source: BlobSource::Directory(default_blob_dir()),
            blob_extension: "xlsx".to_string(),
            refresh_interval: Duration::from_secs(30 * 60),
            unit_timeout: Duration::from_secs(120),
            max_staleness_minutes: 240,
            min_yarn_length: DEFAULT_MIN_YARN_LENGTH,
            log_format: LogFormat::Text,
        }
    }
}

impl ServiceConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let blob_source = match get(env_keys::BLOB_URL) {
            Some(base_url) => BlobSource::Http {
                base_url,
                token: get(env_keys::BLOB_TOKEN),
            },
            None => match get(env_keys::BLOB_DIR) {
                Some(dir) => BlobSource::Directory(PathBuf::from(dir)),
                None => defaults.blob_source.clone(),
            },
        };

        let log_format = match get(env_keys::LOG_FORMAT) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            bind_addr: get(env_keys::BIND_ADDR).unwrap_or(defaults.bind_addr),
            blob_source,
            blob_extension: get(env_keys::BLOB_EXT).unwrap_or(defaults.blob_extension),
            refresh_interval: Duration::from_secs(
                60 * parse_or(
                    get(env_keys::REFRESH_INTERVAL_MINUTES),
                    env_keys::REFRESH_INTERVAL_MINUTES,
                    30u64,
                )
                .max(1),
            ),
            unit_timeout: Duration::from_secs(
                parse_or(get(env_keys::UNIT_TIMEOUT_SECS), env_keys::UNIT_TIMEOUT_SECS, 120u64)
                    .max(1),
            ),
            max_staleness_minutes: parse_or(
                get(env_keys::MAX_STALENESS_MINUTES),
                env_keys::MAX_STALENESS_MINUTES,
                defaults.max_staleness_minutes,
            ),
            min_yarn_length: parse_or(
                get(env_keys::MIN_YARN_LENGTH),
                env_keys::MIN_YARN_LENGTH,
                defaults.min_yarn_length,
            ),
            log_format,
        }
    }

    /// 刷新器参数
    pub fn refresher_options(&self) -> RefresherOptions {
        RefresherOptions {
            unit_timeout: self.unit_timeout,
            max_staleness: (self.max_staleness_minutes > 0)
                .then(|| chrono::Duration::minutes(self.max_staleness_minutes as i64)),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> T {
    match value {
        None => default,
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "配置值格式错误，使用默认值");
                default
            }
        },
    }
}

/// 默认数据目录: {data_dir}/spinning-quality-cache/exports
pub fn default_blob_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("spinning-quality-cache").join("exports"))
        .unwrap_or_else(|| PathBuf::from("./exports"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServiceConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.refresh_interval, Duration::from_secs(1800));
        assert_eq!(config.min_yarn_length, 300.0);
        assert_eq!(config.blob_extension, "xlsx");
        assert!(matches!(config.blob_source, BlobSource::Directory(_)));
    }

    #[test]
    fn test_http_source_takes_precedence() {
        let config = config_from(&[
            (env_keys::BLOB_DIR, "/data"),
            (env_keys::BLOB_URL, "https://example.net/exports"),
            (env_keys::BLOB_TOKEN, "sig=abc"),
        ]);
        assert_eq!(
            config.blob_source,
            BlobSource::Http {
                base_url: "https://example.net/exports".to_string(),
                token: Some("sig=abc".to_string()),
            }
        );
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            (env_keys::REFRESH_INTERVAL_MINUTES, "soon"),
            (env_keys::UNIT_TIMEOUT_SECS, "15"),
            (env_keys::MAX_STALENESS_MINUTES, "0"),
        ]);
        assert_eq!(config.refresh_interval, Duration::from_secs(1800));
        assert_eq!(config.unit_timeout, Duration::from_secs(15));
        assert!(config.refresher_options().max_staleness.is_none());
    }
}
