//! 单内容会话 - 流程层
//!
//! 针对一个内容（一段文本或一张图片），把一组指令并发分发给指令仓库：
//!
//! 1. 空指令列表直接返回空结果，不发请求
//! 2. classify 方法要求至少两个候选类别，否则在分发前同步报错
//! 3. 每条指令一个 tokio 任务，经过 [`TaskLimiter`] 限流
//! 4. 按输入顺序等待任务句柄，结果与指令一一对应，与完成顺序无关
//!
//! 单条指令失败不影响其他指令，失败以 [`InstructionError`] 嵌入结果。
//! 丢弃 `process` 的 future 会中止本批所有未完成的指令。

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::{InputError, InstructionError, InstructionOutcome};
use crate::infrastructure::TaskLimiter;
use crate::models::{
    ClassificationEntry, ContentItem, Instruction, InstructionMethod, InstructionWithOutcome,
    PerceptorRequest, RequestEnvelope,
};
use crate::services::InstructionRepository;

/// classify 方法最少需要的候选类别数
const MIN_CLASSES: usize = 2;

/// 一批指令任务
///
/// 调用方丢弃 `process` 的 future 时，drop 会中止所有尚未完成的任务，
/// 排队中的指令不再发送，在途请求被丢弃，槽位随之归还。
struct InstructionTasks(Vec<(Instruction, JoinHandle<InstructionOutcome>)>);

impl Drop for InstructionTasks {
    fn drop(&mut self) {
        for (_, handle) in &self.0 {
            handle.abort();
        }
    }
}

/// 单内容会话
///
/// 持有共享的限流器和仓库，内容本身在会话内只保存一份。
#[derive(Clone)]
pub struct ContentSession {
    limiter: TaskLimiter,
    repository: Arc<dyn InstructionRepository>,
    content: Arc<ContentItem>,
}

impl ContentSession {
    pub fn new(
        limiter: TaskLimiter,
        repository: Arc<dyn InstructionRepository>,
        content: ContentItem,
    ) -> Self {
        Self {
            limiter,
            repository,
            content: Arc::new(content),
        }
    }

    /// 处理一组指令，返回与 `instructions` 等长、同序的结果
    pub async fn process(
        &self,
        request: &PerceptorRequest,
        method: InstructionMethod,
        instructions: &[Instruction],
        classes: &[ClassificationEntry],
        cancel: &CancellationToken,
    ) -> Result<Vec<InstructionWithOutcome>, InputError> {
        if instructions.is_empty() {
            return Ok(Vec::new());
        }

        if method == InstructionMethod::Classify && classes.len() < MIN_CLASSES {
            return Err(InputError::InsufficientClasses { got: classes.len() });
        }

        debug!(
            "🔀 分发 {} 条指令 [{}] ({})",
            instructions.len(),
            method,
            self.content.context_type()
        );

        let request = Arc::new(request.clone());
        let classes: Arc<[ClassificationEntry]> = classes.into();

        let mut tasks = InstructionTasks(
            instructions
                .iter()
                .map(|instruction| {
                    let envelope = RequestEnvelope::new(
                        request.clone(),
                        method,
                        self.content.clone(),
                        instruction.clone(),
                        classes.clone(),
                    );
                    let handle = self.spawn_instruction(envelope, cancel.clone());
                    (instruction.clone(), handle)
                })
                .collect(),
        );

        let mut results = Vec::with_capacity(tasks.0.len());
        for (instruction, handle) in tasks.0.iter_mut() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("❌ 指令任务执行失败 [{}]: {}", instruction, e);
                    Err(InstructionError::Unknown)
                }
            };
            results.push(InstructionWithOutcome::new(instruction.clone(), outcome));
        }

        Ok(results)
    }

    /// 为一条指令创建任务，在限流槽位内发送
    fn spawn_instruction(
        &self,
        envelope: RequestEnvelope,
        cancel: CancellationToken,
    ) -> JoinHandle<InstructionOutcome> {
        let limiter = self.limiter.clone();
        let repository = self.repository.clone();

        tokio::spawn(async move {
            let repository = &repository;
            let envelope = &envelope;
            let token = &cancel;
            limiter
                .exec(
                    move || async move { repository.send_instruction(envelope, token).await },
                    &cancel,
                )
                .await
                .unwrap_or(Err(InstructionError::Cancelled))
        })
    }
}
