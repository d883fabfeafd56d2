//! 流程层（Workflow Layer）
//!
//! 定义"一个内容 × 一组指令"的完整处理流程。

pub mod content_session;

pub use content_session::ContentSession;
