//! 业务能力层（Services Layer）
//!
//! 只处理单条指令：构建请求体、发送、解析回答。

pub mod payload;
pub mod repository;
pub mod sse_decoder;
pub mod structured_response;

pub use repository::{HttpInstructionRepository, InstructionRepository};
pub use structured_response::{parse_structured_text, ResponseValue, StructuredResponse};
