//! 多内容编排器 - 编排层
//!
//! 把同一组指令分发到多个内容（例如文档的每一页）：
//!
//! - 各内容的会话并发执行，共享同一个限流器，并发上限是全局的
//! - 输出与输入内容一一对应，`page_index` 为内容的位置（从 0 开始）
//! - 输出顺序与完成顺序无关

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::error::InputError;
use crate::models::{
    ClassificationEntry, DocumentImageResult, Instruction, InstructionMethod,
    InstructionWithResult, PerceptorRequest,
};
use crate::workflow::ContentSession;

/// 并发处理多个内容会话
///
/// classify 方法的候选类别不足时，每个会话都会在分发前失败，这里返回第一个错误。
pub async fn process_many(
    sessions: &[ContentSession],
    request: &PerceptorRequest,
    method: InstructionMethod,
    instructions: &[Instruction],
    classes: &[ClassificationEntry],
    cancel: &CancellationToken,
) -> Result<Vec<DocumentImageResult>, InputError> {
    let tasks = sessions.iter().enumerate().map(move |(page_index, session)| async move {
        let outcomes = session
            .process(request, method, instructions, classes, cancel)
            .await?;
        let results = outcomes
            .into_iter()
            .map(InstructionWithResult::from)
            .collect();
        Ok::<_, InputError>(DocumentImageResult::new(page_index, results))
    });

    join_all(tasks).await.into_iter().collect()
}
