use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MAX_PARALLEL_REQUESTS: usize = 3;
const DEFAULT_RETRY_COUNT: u32 = 3;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientSettings {
    /// 鉴权用 API key
    pub api_key: String,
    /// 推理服务地址
    pub url: String,
    /// 单次请求超时，同时作为 waitTimeout 发给服务端
    pub wait_timeout: Duration,
    /// 最大并发请求数（全局，跨页面和指令）
    pub max_parallel_requests: usize,
    /// 超时或取消后的额外重试次数
    pub retry_count: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            url: String::new(),
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
            max_parallel_requests: DEFAULT_MAX_PARALLEL_REQUESTS,
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }
}

/// 配置文件格式
#[derive(Debug, Deserialize)]
struct SettingsFile {
    api_key: String,
    url: String,
    wait_timeout_secs: Option<f64>,
    max_parallel_requests: Option<usize>,
    retry_count: Option<u32>,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub fn with_max_parallel_requests(mut self, max_parallel_requests: usize) -> Self {
        self.max_parallel_requests = max_parallel_requests;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// 从环境变量读取配置，数值解析失败时使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("PERCEPTOR_API_KEY").unwrap_or(default.api_key),
            url: std::env::var("PERCEPTOR_URL").unwrap_or(default.url),
            wait_timeout: std::env::var("PERCEPTOR_WAIT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default.wait_timeout),
            max_parallel_requests: std::env::var("PERCEPTOR_MAX_PARALLEL_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_parallel_requests),
            retry_count: std::env::var("PERCEPTOR_RETRY_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.retry_count),
        }
    }

    /// 从 TOML 文件加载配置
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::load(path, e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Load { source, .. } => ConfigError::Load {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: SettingsFile =
            toml::from_str(content).map_err(|e| ConfigError::load("<inline>", e))?;
        let default = Self::default();

        let wait_timeout = match file.wait_timeout_secs {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|_| {
                ConfigError::Invalid(format!("\nwait_timeout_secs must be positive, got {}", secs))
            })?,
            None => default.wait_timeout,
        };

        Ok(Self {
            api_key: file.api_key,
            url: file.url,
            wait_timeout,
            max_parallel_requests: file
                .max_parallel_requests
                .unwrap_or(default.max_parallel_requests),
            retry_count: file.retry_count.unwrap_or(default.retry_count),
        })
    }

    /// 校验配置，所有问题聚合为一条错误文本
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = String::new();

        if self.api_key.trim().is_empty() {
            let _ = writeln!(errors, "invalid api_key");
        }
        if !is_valid_url(&self.url) {
            let _ = writeln!(errors, "invalid url");
        }
        if self.max_parallel_requests < 1 {
            let _ = writeln!(errors, "max_parallel_requests must be >= 1");
        }
        if self.wait_timeout.is_zero() {
            let _ = writeln!(errors, "wait_timeout must be > 0");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicySettings {
        RetryPolicySettings {
            retry_count: self.retry_count,
            request_timeout: self.wait_timeout,
        }
    }

    pub(crate) fn repository(&self) -> RepositorySettings {
        RepositorySettings {
            api_key: self.api_key.clone(),
            url: self.url.clone(),
            wait_timeout: self.wait_timeout,
        }
    }
}

fn is_valid_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// 重试/超时策略配置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicySettings {
    pub retry_count: u32,
    pub request_timeout: Duration,
}

/// 响应仓库配置
#[derive(Clone, Debug)]
pub struct RepositorySettings {
    pub api_key: String,
    pub url: String,
    pub wait_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_valid_settings() {
        let settings = ClientSettings::new("key", "https://perceptor.example.com/v1");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.wait_timeout, Duration::from_secs(60));
        assert_eq!(settings.max_parallel_requests, 3);
        assert_eq!(settings.retry_count, 3);
    }

    #[test]
    fn test_validation_errors_are_aggregated() {
        let settings = ClientSettings::new("  ", "not a url").with_max_parallel_requests(0);

        let err = settings.validate().unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Invalid client settings:"));
        assert!(text.contains("invalid api_key"));
        assert!(text.contains("invalid url"));
        assert!(text.contains("max_parallel_requests must be >= 1"));
    }

    #[test]
    fn test_non_http_url_is_rejected() {
        let settings = ClientSettings::new("key", "ftp://perceptor.example.com");
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let settings = ClientSettings::from_toml_str(
            r#"
            api_key = "secret"
            url = "https://perceptor.example.com"
            wait_timeout_secs = 12.5
            max_parallel_requests = 8
            "#,
        )
        .unwrap();

        assert_eq!(settings.api_key, "secret");
        assert_eq!(settings.wait_timeout, Duration::from_millis(12_500));
        assert_eq!(settings.max_parallel_requests, 8);
        assert_eq!(settings.retry_count, 3);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key = \"k\"\nurl = \"http://localhost:8080\"\nretry_count = 0").unwrap();

        let settings = ClientSettings::from_toml_file(file.path()).unwrap();
        assert_eq!(settings.retry_count, 0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = ClientSettings::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_negative_timeout_in_toml_is_rejected() {
        let err = ClientSettings::from_toml_str(
            "api_key = \"k\"\nurl = \"http://localhost\"\nwait_timeout_secs = -1.0",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_derived_settings() {
        let settings = ClientSettings::new("key", "http://localhost")
            .with_wait_timeout(Duration::from_secs(5))
            .with_retry_count(1);

        assert_eq!(
            settings.retry_policy(),
            RetryPolicySettings {
                retry_count: 1,
                request_timeout: Duration::from_secs(5),
            }
        );
        let repo = settings.repository();
        assert_eq!(repo.url, "http://localhost");
        assert_eq!(repo.wait_timeout, Duration::from_secs(5));
    }
}
