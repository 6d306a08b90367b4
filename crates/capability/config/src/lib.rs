//! 应用运行配置加载。

use std::env;
use std::path::PathBuf;

/// 配置加载错误。
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 本地存储后端。
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    File(PathBuf),
    Memory,
    /// Redis 地址与可选的键命名空间。
    Redis {
        url: String,
        namespace: Option<String>,
    },
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub store_backend: StoreBackend,
    pub email: Option<String>,
    pub password: Option<String>,
    pub facility: Option<String>,
    /// 提交成功后只清除已提交的模板，而不是整个设施前缀。
    pub clear_submitted_only: bool,
    pub http_timeout_seconds: Option<u64>,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = read_optional(&lookup, "DAM_API_URL")
            .ok_or_else(|| ConfigError::Missing("DAM_API_URL".to_string()))?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid("DAM_API_URL".to_string(), api_url));
        }
        let api_url = api_url.trim_end_matches('/').to_string();

        let backend =
            read_optional(&lookup, "DAM_STORE_BACKEND").unwrap_or_else(|| "file".to_string());
        let store_backend = match backend.to_ascii_lowercase().as_str() {
            "file" => StoreBackend::File(PathBuf::from(
                read_optional(&lookup, "DAM_STORE_PATH")
                    .unwrap_or_else(|| "dam-field-store.json".to_string()),
            )),
            "memory" => StoreBackend::Memory,
            "redis" => StoreBackend::Redis {
                url: read_optional(&lookup, "DAM_REDIS_URL")
                    .ok_or_else(|| ConfigError::Missing("DAM_REDIS_URL".to_string()))?,
                namespace: read_optional(&lookup, "DAM_REDIS_NAMESPACE"),
            },
            _ => return Err(ConfigError::Invalid("DAM_STORE_BACKEND".to_string(), backend)),
        };

        let clear_policy =
            read_optional(&lookup, "DAM_CLEAR_POLICY").unwrap_or_else(|| "all".to_string());
        let clear_submitted_only = match clear_policy.to_ascii_lowercase().as_str() {
            "all" => false,
            "submitted" => true,
            _ => {
                return Err(ConfigError::Invalid(
                    "DAM_CLEAR_POLICY".to_string(),
                    clear_policy,
                ));
            }
        };

        let http_timeout_seconds =
            read_optional_u64(&lookup, "DAM_HTTP_TIMEOUT_SECONDS")?.filter(|value| *value > 0);

        Ok(Self {
            api_url,
            store_backend,
            email: read_optional(&lookup, "DAM_EMAIL"),
            password: read_optional(&lookup, "DAM_PASSWORD"),
            facility: read_optional(&lookup, "DAM_FACILITY"),
            clear_submitted_only,
            http_timeout_seconds,
        })
    }
}

fn read_optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn read_optional_u64<F>(lookup: &F, key: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match read_optional(lookup, key) {
        None => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
    }
}
