use std::collections::HashMap;
use std::sync::Arc;

use super::content::{ClassificationEntry, ContentItem, Instruction, InstructionMethod};

/// 调用方提供的请求配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerceptorRequest {
    /// 模型风格
    pub flavor: String,
    /// 透传给服务端的参数
    pub parameters: HashMap<String, String>,
    /// 是否返回打分
    pub return_scores: bool,
}

impl PerceptorRequest {
    pub fn new(
        flavor: impl Into<String>,
        parameters: HashMap<String, String>,
        return_scores: bool,
    ) -> Self {
        Self {
            flavor: flavor.into(),
            parameters,
            return_scores,
        }
    }

    /// 使用默认参数和指定 flavor 创建
    pub fn with_flavor(flavor: impl Into<String>) -> Self {
        Self::new(flavor, HashMap::new(), false)
    }

    /// 返回 `return_scores` 为 true 的副本
    pub fn with_return_scores(self) -> Self {
        Self {
            return_scores: true,
            ..self
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// 单次 HTTP 调用的完整请求信息
///
/// 每个 (内容, 指令) 组合构建一个，只在一次调用期间存在。
/// 同一批次内共享的部分用 `Arc` 持有，避免为每条指令复制图片内容。
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub request: Arc<PerceptorRequest>,
    pub method: InstructionMethod,
    pub content: Arc<ContentItem>,
    pub instruction: Instruction,
    pub classes: Arc<[ClassificationEntry]>,
}

impl RequestEnvelope {
    pub fn new(
        request: Arc<PerceptorRequest>,
        method: InstructionMethod,
        content: Arc<ContentItem>,
        instruction: Instruction,
        classes: Arc<[ClassificationEntry]>,
    ) -> Self {
        Self {
            request,
            method,
            content,
            instruction,
            classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_return_scores_keeps_parameters() {
        let request = PerceptorRequest::with_flavor("original")
            .with_parameter("temperature", "0.1")
            .with_return_scores();

        assert!(request.return_scores);
        assert_eq!(request.flavor, "original");
        assert_eq!(request.parameters.get("temperature").map(String::as_str), Some("0.1"));
    }
}
