//! HTTP 传输门面 - 基础设施层
//!
//! 持有 `reqwest::Client`，只暴露"发送一次请求并读完响应体"的能力。
//! 不认识指令、不解析响应内容，只把传输层异常分类为 [`TransportError`]。

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TransportError;

/// 待发送请求的描述
///
/// 每次尝试都由工厂重新生成，重试之间不共享同一个请求对象。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

/// 已完整读取的原始响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// 请求工厂
pub type RequestFactory<'a> = &'a (dyn Fn() -> OutgoingRequest + Send + Sync);

/// HTTP 传输能力
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 由工厂构建一个请求并发送，返回读完响应体的原始响应
    async fn send(
        &self,
        factory: RequestFactory<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(
        &self,
        factory: RequestFactory<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        (**self).send(factory, cancel).await
    }
}

/// 基于 reqwest 的传输实现
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// 创建带整体超时的客户端
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }

    async fn execute(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.body(request.body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("收到响应: status={}, body 长度={}", status, body.len());

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        factory: RequestFactory<'_>,
        cancel: &CancellationToken,
    ) -> Result<RawResponse, TransportError> {
        let request = factory();
        debug!("发送请求: {} {}", request.method, request.url);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.execute(request) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request_to(url: String) -> OutgoingRequest {
        OutgoingRequest {
            method: Method::POST,
            url,
            headers: vec![("Authorization", "Bearer test-key".to_string())],
            body: r#"{"a":1}"#.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_reads_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(header("Authorization", "Bearer test-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"{"a":1}"#))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad input"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(reqwest::Client::new());
        let url = format!("{}/generate", server.uri());
        let factory = move || request_to(url.clone());

        let response = transport
            .send(&factory, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response, RawResponse::new(400, "bad input"));
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(reqwest::Client::new());
        let url = server.uri();
        let factory = move || request_to(url.clone());
        let cancel = CancellationToken::new();

        let canceller = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                cancel.cancel();
            })
        };

        let result = transport.send(&factory, &cancel).await;
        canceller.await.unwrap();

        assert_eq!(result, Err(TransportError::Cancelled));
    }

    #[tokio::test]
    async fn test_client_timeout_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::with_timeout(Duration::from_millis(50)).unwrap();
        let url = server.uri();
        let factory = move || request_to(url.clone());

        let result = transport.send(&factory, &CancellationToken::new()).await;

        assert_eq!(result, Err(TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_connection_failure_is_unknown() {
        let transport = ReqwestTransport::new(reqwest::Client::new());
        let factory = || request_to("http://127.0.0.1:1/generate".to_string());

        let result = transport.send(&factory, &CancellationToken::new()).await;

        assert!(matches!(result, Err(TransportError::Unknown(_))));
    }
}
