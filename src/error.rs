use std::path::PathBuf;

use thiserror::Error;

/// 客户端错误类型
///
/// 只用于同步抛出的错误（配置校验、输入校验、文件读取）。
/// 单条指令的失败不会走这里，而是作为 [`InstructionError`] 嵌入结果列表。
#[derive(Debug, Error)]
pub enum ClientError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输入错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// HTTP 客户端创建失败
    #[error("HTTP 客户端创建失败: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 校验失败，所有问题聚合为一条文本
    #[error("Invalid client settings:{0}")]
    Invalid(String),
    /// 配置文件读取或解析失败
    #[error("无法加载配置文件 {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 输入错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// classify 方法的候选类别不足两个
    #[error("number of classes must be > 1 (got {got})")]
    InsufficientClasses { got: usize },
    /// 不支持的图片类型
    #[error("invalid file type '{file_type}', allowed: png,jpg,jpeg")]
    InvalidFileType { file_type: String },
}

/// 单条指令的失败原因
///
/// `Display` 输出即对外暴露的错误文本。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InstructionError {
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("Unknown error")]
    Unknown,
    #[error("Request timeout")]
    Timeout,
    #[error("Request cancelled")]
    Cancelled,
    /// 服务端返回 400/204 时的 detail 文本
    #[error("{0}")]
    BadRequest(String),
}

impl InstructionError {
    /// 对外展示的错误文本
    pub fn error_text(&self) -> String {
        self.to_string()
    }
}

/// 传输层错误，由传输门面和重试策略分类
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// 单次请求超时
    #[error("请求超时")]
    Timeout,
    /// 请求被取消
    #[error("请求被取消")]
    Cancelled,
    /// 其他传输错误（连接失败、读取响应失败等）
    #[error("传输失败: {0}")]
    Unknown(String),
}

impl TransportError {
    /// 是否为瞬时错误（允许重试）
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Cancelled)
    }
}

impl From<TransportError> for InstructionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => InstructionError::Timeout,
            TransportError::Cancelled => InstructionError::Cancelled,
            TransportError::Unknown(_) => InstructionError::Unknown,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Unknown(err.to_string())
        }
    }
}

// ========== 便捷构造函数 ==========

impl ClientError {
    /// 创建文件读取错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClientError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ConfigError {
    /// 创建配置文件加载错误
    pub fn load(
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::Load {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

// ========== Result 类型别名 ==========

/// 客户端结果类型
pub type ClientResult<T> = Result<T, ClientError>;

/// 单条指令的结果：成功为原始回答文本，失败为分类后的错误
pub type InstructionOutcome = Result<String, InstructionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_error_texts() {
        assert_eq!(InstructionError::InvalidApiKey.error_text(), "invalid api key");
        assert_eq!(InstructionError::Unknown.error_text(), "Unknown error");
        assert_eq!(InstructionError::Timeout.error_text(), "Request timeout");
        assert_eq!(InstructionError::Cancelled.error_text(), "Request cancelled");
        assert_eq!(
            InstructionError::BadRequest("input data error".to_string()).error_text(),
            "input data error"
        );
    }

    #[test]
    fn test_transport_error_mapping() {
        assert_eq!(
            InstructionError::from(TransportError::Timeout),
            InstructionError::Timeout
        );
        assert_eq!(
            InstructionError::from(TransportError::Cancelled),
            InstructionError::Cancelled
        );
        assert_eq!(
            InstructionError::from(TransportError::Unknown("boom".into())),
            InstructionError::Unknown
        );
        assert!(TransportError::Timeout.is_transient());
        assert!(!TransportError::Unknown("boom".into()).is_transient());
    }
}
