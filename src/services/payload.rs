//! 请求体构建与响应辅助函数 - 能力层

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::models::{InstructionMethod, RequestEnvelope};

const RETURN_SCORES_KEY: &str = "returnScores";
const DETAIL_KEY: &str = "detail";

/// 发送给服务端的 JSON 请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPayload<'a> {
    flavor: &'a str,
    context_type: &'a str,
    context: &'a str,
    instruction: &'a str,
    /// 服务端等待时间（秒）
    wait_timeout: f64,
    params: BTreeMap<&'a str, &'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    classes: Option<Vec<&'a str>>,
}

/// 将请求信息序列化为 JSON 请求体
///
/// `params` 为调用方参数加上 `returnScores`（"true"/"false"），
/// 只有 classify 方法才带 `classes`。
pub fn build_payload(
    envelope: &RequestEnvelope,
    wait_timeout: Duration,
) -> Result<String, serde_json::Error> {
    let mut params: BTreeMap<&str, &str> = envelope
        .request
        .parameters
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    params.insert(
        RETURN_SCORES_KEY,
        if envelope.request.return_scores {
            "true"
        } else {
            "false"
        },
    );

    let classes = (envelope.method == InstructionMethod::Classify)
        .then(|| envelope.classes.iter().map(|c| c.value()).collect());

    let payload = RequestPayload {
        flavor: &envelope.request.flavor,
        context_type: envelope.content.context_type(),
        context: envelope.content.payload(),
        instruction: envelope.instruction.text(),
        wait_timeout: wait_timeout.as_secs_f64(),
        params,
        classes,
    };

    serde_json::to_string(&payload)
}

/// 从 400/204 响应体中取出错误描述
///
/// - 响应体为带 `detail` 的 JSON 对象：字符串原样返回，null 返回空串，其他结构序列化为紧凑 JSON
/// - 没有 `detail` 或不是合法 JSON 对象：返回原始响应体
pub fn map_bad_request_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Map<String, Value>>(body) {
        Ok(mut object) => match object.remove(DETAIL_KEY) {
            Some(Value::String(detail)) => detail,
            Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}

/// 用恰好一个 `/` 拼接基础地址和路径段
///
/// 任意一侧为空时直接返回另一侧，不补也不去掉分隔符。
pub fn concat_url(base: &str, segment: &str) -> String {
    match (base.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            segment.trim_start_matches('/')
        ),
    }
}
