//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{InstructionMethod, InstructionWithResult};

/// 初始化日志
///
/// 日志级别由 `RUST_LOG` 控制，默认 `info`。重复调用不会报错。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 记录客户端创建信息
///
/// # 参数
/// - `url`: 服务地址
/// - `max_parallel`: 最大并发请求数
/// - `retry_count`: 重试次数
pub fn log_client_created(url: &str, max_parallel: usize, retry_count: u32) {
    info!("🚀 Perceptor 客户端已创建");
    info!("🌐 服务地址: {}", url);
    info!("📊 最大并发请求数: {}, 重试次数: {}", max_parallel, retry_count);
}

/// 记录批次开始信息
///
/// # 参数
/// - `method`: 指令方法
/// - `contexts`: 内容数量
/// - `instructions`: 每个内容的指令数量
pub fn log_batch_start(method: InstructionMethod, contexts: usize, instructions: usize) {
    info!(
        "📦 开始处理 [{}]: {} 个内容 × {} 条指令",
        method, contexts, instructions
    );
}

/// 记录批次完成信息
///
/// # 参数
/// - `method`: 指令方法
/// - `results`: 所有结果
pub fn log_batch_complete<'a>(
    method: InstructionMethod,
    results: impl IntoIterator<Item = &'a InstructionWithResult>,
) {
    let (success, total) = results
        .into_iter()
        .fold((0, 0), |(success, total), r| {
            (success + usize::from(r.is_success), total + 1)
        });
    info!("✓ [{}] 完成: 成功 {}/{}", method, success, total);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
