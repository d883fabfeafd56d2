//! 对外暴露的结果类型

use crate::error::{InstructionError, InstructionOutcome};
use crate::services::structured_response::{parse_structured_text, StructuredResponse};

use super::content::Instruction;

/// 指令与其原始结果的配对（内部使用）
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionWithOutcome {
    pub instruction: Instruction,
    pub outcome: InstructionOutcome,
}

impl InstructionWithOutcome {
    pub fn new(instruction: Instruction, outcome: InstructionOutcome) -> Self {
        Self {
            instruction,
            outcome,
        }
    }
}

/// 单条指令的结果
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionWithResult {
    pub instruction_text: String,
    pub is_success: bool,
    /// 结构化回答，失败时为空
    pub response: StructuredResponse,
    /// 错误文本，成功时为空
    pub error_text: String,
}

impl InstructionWithResult {
    pub fn success(instruction_text: impl Into<String>, response: StructuredResponse) -> Self {
        Self {
            instruction_text: instruction_text.into(),
            is_success: true,
            response,
            error_text: String::new(),
        }
    }

    pub fn error(instruction_text: impl Into<String>, error: &InstructionError) -> Self {
        Self {
            instruction_text: instruction_text.into(),
            is_success: false,
            response: StructuredResponse::new(),
            error_text: error.error_text(),
        }
    }

    /// 回答中的 `text` 字段
    pub fn text(&self) -> Option<&str> {
        self.response.get("text").and_then(|v| v.as_text())
    }
}

impl From<InstructionWithOutcome> for InstructionWithResult {
    fn from(model: InstructionWithOutcome) -> Self {
        match &model.outcome {
            Ok(answer) => Self::success(model.instruction.text(), parse_structured_text(answer)),
            Err(error) => Self::error(model.instruction.text(), error),
        }
    }
}

/// 多页请求中单页的结果
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentImageResult {
    /// 原始页面的索引（从 0 开始）
    pub page_index: usize,
    pub results: Vec<InstructionWithResult>,
}

impl DocumentImageResult {
    pub fn new(page_index: usize, results: Vec<InstructionWithResult>) -> Self {
        Self {
            page_index,
            results,
        }
    }
}

/// 按指令分组后，单页的结果
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPageWithResult {
    pub page_index: usize,
    pub is_success: bool,
    pub response: StructuredResponse,
    pub error_text: String,
}

/// 按指令分组后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionWithPageResult {
    pub instruction_text: String,
    pub page_results: Vec<DocumentPageWithResult>,
}

/// 将按页组织的结果转换为按指令组织
///
/// 指令顺序取第一页的顺序，每条指令下的页面保持输入顺序。
pub fn group_by_instruction(pages: &[DocumentImageResult]) -> Vec<InstructionWithPageResult> {
    let Some(first) = pages.first() else {
        return Vec::new();
    };

    first
        .results
        .iter()
        .map(|r| &r.instruction_text)
        .map(|instruction_text| InstructionWithPageResult {
            instruction_text: instruction_text.clone(),
            page_results: pages
                .iter()
                .filter_map(|page| {
                    page.results
                        .iter()
                        .find(|r| &r.instruction_text == instruction_text)
                        .map(|r| DocumentPageWithResult {
                            page_index: page.page_index,
                            is_success: r.is_success,
                            response: r.response.clone(),
                            error_text: r.error_text.clone(),
                        })
                })
                .collect(),
        })
        .collect()
}
