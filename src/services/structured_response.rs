//! 结构化回答解析 - 能力层
//!
//! 服务端的回答可能是纯文本，也可能是一个 JSON 对象（例如带打分的回答）。
//! 统一转换为以 `text` 为主键的字符串树。

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// 主回答所在的键
pub const KEY_TEXT: &str = "text";

/// 结构化回答中的一个值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Text(String),
    Map(BTreeMap<String, ResponseValue>),
    List(Vec<ResponseValue>),
}

impl ResponseValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ResponseValue>> {
        match self {
            ResponseValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResponseValue]> {
        match self {
            ResponseValue::List(list) => Some(list),
            _ => None,
        }
    }
}

impl From<Value> for ResponseValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ResponseValue::Text(text),
            Value::Null => ResponseValue::Text(String::new()),
            Value::Object(object) => ResponseValue::Map(
                object
                    .into_iter()
                    .map(|(k, v)| (k, ResponseValue::from(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                ResponseValue::List(items.into_iter().map(ResponseValue::from).collect())
            }
            scalar => ResponseValue::Text(scalar.to_string()),
        }
    }
}

/// 结构化回答
pub type StructuredResponse = BTreeMap<String, ResponseValue>;

/// 将原始回答解析为结构化回答
///
/// - 空白回答 → `{"text": ""}`
/// - JSON 对象 → 逐个成员转换，缺少 `text` 时补一个空串
/// - 其他内容（包括数字、数组等非对象 JSON）→ `{"text": 原始回答}`
pub fn parse_structured_text(answer: &str) -> StructuredResponse {
    if answer.trim().is_empty() {
        return text_only(String::new());
    }

    match serde_json::from_str::<serde_json::Map<String, Value>>(answer) {
        Ok(object) => {
            let mut response: StructuredResponse = object
                .into_iter()
                .map(|(k, v)| (k, ResponseValue::from(v)))
                .collect();
            response
                .entry(KEY_TEXT.to_string())
                .or_insert_with(|| ResponseValue::Text(String::new()));
            response
        }
        Err(_) => text_only(answer.to_string()),
    }
}

fn text_only(text: String) -> StructuredResponse {
    BTreeMap::from([(KEY_TEXT.to_string(), ResponseValue::Text(text))])
}
