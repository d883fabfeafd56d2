//! 指令仓库 - 能力层
//!
//! 职责：
//! - 把一条指令构建成 HTTP 请求并通过传输层发送
//! - 把 HTTP 状态码和响应体映射为 [`InstructionOutcome`]
//! - 不处理并发，不认识批次

use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::RepositorySettings;
use crate::error::{InstructionError, InstructionOutcome};
use crate::infrastructure::{HttpTransport, OutgoingRequest, RawResponse};
use crate::models::{InstructionMethod, RequestEnvelope};
use crate::services::payload::{build_payload, concat_url, map_bad_request_detail};
use crate::services::sse_decoder::decode_answer;
use crate::utils::logging::truncate_text;

/// 单条指令的发送能力
#[async_trait]
pub trait InstructionRepository: Send + Sync {
    /// 发送一条指令，所有失败都以 `Err(InstructionError)` 返回而不是 panic
    async fn send_instruction(
        &self,
        envelope: &RequestEnvelope,
        cancel: &CancellationToken,
    ) -> InstructionOutcome;
}

/// 基于 HTTP 的指令仓库
///
/// 鉴权头和各方法的 URL 在第一次使用时计算并缓存。
pub struct HttpInstructionRepository<T> {
    transport: T,
    settings: RepositorySettings,
    authorization: OnceLock<String>,
    generate_url: OnceLock<String>,
    classify_url: OnceLock<String>,
    table_url: OnceLock<String>,
}

impl<T: HttpTransport> HttpInstructionRepository<T> {
    pub fn new(transport: T, settings: RepositorySettings) -> Self {
        Self {
            transport,
            settings,
            authorization: OnceLock::new(),
            generate_url: OnceLock::new(),
            classify_url: OnceLock::new(),
            table_url: OnceLock::new(),
        }
    }

    fn authorization(&self) -> &str {
        self.authorization
            .get_or_init(|| format!("Bearer {}", self.settings.api_key))
    }

    fn url_for(&self, method: InstructionMethod) -> &str {
        let cell = match method {
            InstructionMethod::Question => &self.generate_url,
            InstructionMethod::Classify => &self.classify_url,
            InstructionMethod::Table => &self.table_url,
        };
        cell.get_or_init(|| concat_url(&self.settings.url, method.path()))
    }

    fn build_request(&self, envelope: &RequestEnvelope, body: &str) -> OutgoingRequest {
        OutgoingRequest {
            method: Method::POST,
            url: self.url_for(envelope.method).to_string(),
            headers: vec![
                ("Accept", "text/event-stream".to_string()),
                ("Authorization", self.authorization().to_string()),
            ],
            body: body.to_string(),
        }
    }
}

/// 将 HTTP 响应映射为指令结果
fn map_response(response: RawResponse) -> InstructionOutcome {
    match response.status {
        200 => Ok(decode_answer(&response.body)),
        403 => Err(InstructionError::InvalidApiKey),
        400 | 204 => Err(InstructionError::BadRequest(map_bad_request_detail(
            &response.body,
        ))),
        _ => Err(InstructionError::Unknown),
    }
}

#[async_trait]
impl<T: HttpTransport> InstructionRepository for HttpInstructionRepository<T> {
    async fn send_instruction(
        &self,
        envelope: &RequestEnvelope,
        cancel: &CancellationToken,
    ) -> InstructionOutcome {
        let body = match build_payload(envelope, self.settings.wait_timeout) {
            Ok(body) => body,
            Err(e) => {
                error!("❌ 请求体序列化失败 [{}]: {}", envelope.method, e);
                return Err(InstructionError::Unknown);
            }
        };
        let factory = || self.build_request(envelope, &body);

        debug!(
            "📤 发送指令 [{}]: {}",
            envelope.method,
            truncate_text(envelope.instruction.text(), 50)
        );

        let response = match self.transport.send(&factory, cancel).await {
            Ok(response) => response,
            Err(err) => {
                warn!("⚠️ 指令请求失败 [{}]: {}", envelope.method, err);
                return Err(err.into());
            }
        };

        if response.status != 200 {
            warn!(
                "⚠️ 服务端返回非 200 状态 [{}]: {}",
                envelope.method, response.status
            );
        }

        let outcome = map_response(response);
        if let Ok(answer) = &outcome {
            debug!("📥 收到回答: {}", truncate_text(answer, 50));
        }
        outcome
    }
}
