//! 重试/超时策略 - 基础设施层
//!
//! 以装饰器的形式包装任意 [`HttpTransport`]：
//! - 超时作用于每一次尝试
//! - 重试作用于整个尝试序列，只对超时和非调用方发起的取消重试
//! - HTTP 状态码（4xx/5xx）原样返回，不重试
//! - 调用方取消立即返回，不再重试

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RetryPolicySettings;
use crate::error::TransportError;
use crate::infrastructure::http_transport::{HttpTransport, RawResponse, RequestFactory};

/// 带重试和超时的传输装饰器
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    settings: RetryPolicySettings,
}

impl<T: HttpTransport> RetryingTransport<T> {
    pub fn new(inner: T, settings: RetryPolicySettings) -> Self {
        Self { inner, settings }
    }

    /// 单次尝试，超过 `request_timeout` 视为超时
    async fn attempt(
        &self,
        factory: RequestFactory<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        match tokio::time::timeout(self.settings.request_timeout, self.inner.send(factory, cancel))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for RetryingTransport<T> {
    async fn send(
        &self,
        factory: RequestFactory<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let attempts = self.settings.retry_count.saturating_add(1);
        let mut last_error = TransportError::Unknown("未执行任何请求".to_string());

        for attempt in 1..=attempts {
            match self.attempt(factory, cancel).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!("第 {} 次尝试成功", attempt);
                    }
                    return Ok(response);
                }
                Err(_) if cancel.is_cancelled() => {
                    debug!("调用方已取消请求，不再重试");
                    return Err(TransportError::Cancelled);
                }
                Err(err) if err.is_transient() => {
                    warn!("⚠️ 第 {}/{} 次请求失败: {}", attempt, attempts, err);
                    last_error = err;
                }
                Err(err) => {
                    warn!("⚠️ 请求失败，不可重试: {}", err);
                    return Err(err);
                }
            }
        }

        Err(last_error)
    }
}
