//! 指令上下文与指令本身的值类型

use std::fmt;

/// 指令所针对的内容（一段文本或一张图片）
///
/// 图片内容为 data URI 形式的 base64 字符串，创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentItem {
    Text(String),
    Image(String),
}

impl ContentItem {
    pub fn text(content: impl Into<String>) -> Self {
        ContentItem::Text(content.into())
    }

    pub fn image(data_uri: impl Into<String>) -> Self {
        ContentItem::Image(data_uri.into())
    }

    /// 请求体中的 `contextType`
    pub fn context_type(&self) -> &'static str {
        match self {
            ContentItem::Text(_) => "text",
            ContentItem::Image(_) => "image",
        }
    }

    /// 请求体中的 `context`
    pub fn payload(&self) -> &str {
        match self {
            ContentItem::Text(content) | ContentItem::Image(content) => content,
        }
    }
}

/// 一条指令（问题/提示词），以文本作为身份
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction(String);

impl Instruction {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// classify 方法的一个候选类别
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassificationEntry(String);

impl ClassificationEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// 指令方法，决定请求的目标接口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionMethod {
    Question,
    Classify,
    Table,
}

impl InstructionMethod {
    pub const ALL: [InstructionMethod; 3] = [
        InstructionMethod::Question,
        InstructionMethod::Classify,
        InstructionMethod::Table,
    ];

    /// 接口路径
    pub fn path(self) -> &'static str {
        match self {
            InstructionMethod::Question => "generate",
            InstructionMethod::Classify => "classify",
            InstructionMethod::Table => "generate_table",
        }
    }
}

impl fmt::Display for InstructionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_item_accessors() {
        let text = ContentItem::text("hello");
        assert_eq!(text.context_type(), "text");
        assert_eq!(text.payload(), "hello");

        let image = ContentItem::image("data:image/png;base64,AAAA");
        assert_eq!(image.context_type(), "image");
        assert_eq!(image.payload(), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_method_paths() {
        assert_eq!(InstructionMethod::Question.path(), "generate");
        assert_eq!(InstructionMethod::Classify.path(), "classify");
        assert_eq!(InstructionMethod::Table.path(), "generate_table");
    }
}
