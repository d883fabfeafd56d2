//! # Perceptor Client
//!
//! Perceptor 推理服务的异步客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（并发槽位、HTTP 连接），只暴露能力
//! - `TaskLimiter` - 全局并发槽位
//! - `ReqwestTransport` - 发送一次 HTTP 请求
//! - `RetryingTransport` - 单次超时 + 有限重试
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条指令
//! - `HttpInstructionRepository` - 构建请求、发送、映射状态码
//! - `sse_decoder` - 从事件流中解码最终回答
//! - `structured_response` - 回答结构化
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个内容 × 一组指令"的处理流程
//! - `ContentSession` - 并发分发指令并按输入顺序收集结果
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/client` - 对外的客户端，负责依赖装配
//! - `orchestrator/multi_context` - 多内容调度
//!
//! ## 示例
//!
//! ```no_run
//! use perceptor_client::{ClientSettings, PerceptorClient, PerceptorRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = PerceptorClient::from_settings(ClientSettings::from_env())?;
//! let results = client
//!     .ask_text(
//!         "Ich heiße Hans und wohne in Berlin.",
//!         &PerceptorRequest::with_flavor("original"),
//!         &["Wie heißt er?", "Wo wohnt er?"],
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//!
//! for result in results {
//!     println!("{}: {:?}", result.instruction_text, result.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod input;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::ClientSettings;
pub use error::{
    ClientError, ClientResult, ConfigError, InputError, InstructionError, InstructionOutcome,
};
pub use models::{
    group_by_instruction, ClassificationEntry, ContentItem, DocumentImageResult,
    DocumentPageWithResult, Instruction, InstructionMethod, InstructionWithPageResult,
    InstructionWithResult, PerceptorRequest,
};
pub use orchestrator::PerceptorClient;
pub use services::{InstructionRepository, ResponseValue, StructuredResponse};
pub use tokio_util::sync::CancellationToken;
