//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责依赖装配和多内容调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `client` - Perceptor 客户端
//! - 按配置装配传输、重试、仓库和限流器
//! - 把文本、图片字节、图片文件转换为内容
//! - 对外提供 ask / classify / table 三类操作
//!
//! ### `multi_context` - 多内容编排器
//! - 同一组指令分发到多个内容（文档的每一页）
//! - 输出按内容位置编号，保持输入顺序
//!
//! ## 层次关系
//!
//! ```text
//! client (处理 Vec<ContentItem>)
//!     ↓
//! multi_context (每个内容一个会话)
//!     ↓
//! workflow::ContentSession (一个内容 × 多条指令)
//!     ↓
//! services (能力层：payload / repository / sse_decoder)
//!     ↓
//! infrastructure (基础设施：TaskLimiter / HttpTransport)
//! ```

pub mod client;
pub mod multi_context;

// 重新导出主要类型
pub use client::PerceptorClient;
pub use multi_context::process_many;
