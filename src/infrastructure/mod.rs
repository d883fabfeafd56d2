//! 基础设施层（Infrastructure Layer）
//!
//! 持有稀缺资源（并发槽位、HTTP 连接池），只暴露能力，不认识指令和回答。
//!
//! - `task_limiter` - 全局并发槽位，限制同时在途的请求数
//! - `http_transport` - 发送一次 HTTP 请求并读完响应体
//! - `retry_policy` - 为传输层加上单次超时和有限重试

pub mod http_transport;
pub mod retry_policy;
pub mod task_limiter;

pub use http_transport::{HttpTransport, OutgoingRequest, RawResponse, ReqwestTransport, RequestFactory};
pub use retry_policy::RetryingTransport;
pub use task_limiter::{LimiterCancelled, TaskLimiter};
