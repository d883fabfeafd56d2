//! Perceptor 客户端 - 编排层
//!
//! 对外暴露的唯一入口。负责：
//!
//! 1. **依赖装配**：reqwest 传输 → 重试装饰器 → 指令仓库 → 限流器
//! 2. **输入转换**：文本、图片字节、图片文件 → [`ContentItem`]
//! 3. **结果转换**：原始结果 → [`InstructionWithResult`] / [`DocumentImageResult`]
//!
//! 所有调用共享同一个限流器，clone 出来的客户端也共享。

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ClientSettings;
use crate::error::{ClientResult, InstructionError};
use crate::infrastructure::{ReqwestTransport, RetryingTransport, TaskLimiter};
use crate::input::image_mapper;
use crate::models::{
    ClassificationEntry, ContentItem, DocumentImageResult, Instruction, InstructionMethod,
    InstructionWithResult, PerceptorRequest,
};
use crate::orchestrator::multi_context;
use crate::services::{HttpInstructionRepository, InstructionRepository};
use crate::utils::logging::{log_batch_complete, log_batch_start, log_client_created};
use crate::workflow::ContentSession;

/// Perceptor 客户端
#[derive(Clone)]
pub struct PerceptorClient {
    limiter: TaskLimiter,
    repository: Arc<dyn InstructionRepository>,
}

impl PerceptorClient {
    /// 按配置创建客户端
    ///
    /// 配置不合法时返回聚合后的校验错误，不会创建任何资源。
    pub fn from_settings(settings: ClientSettings) -> ClientResult<Self> {
        settings.validate()?;

        let transport = ReqwestTransport::with_timeout(settings.wait_timeout)?;
        let transport = RetryingTransport::new(transport, settings.retry_policy());
        let repository = HttpInstructionRepository::new(transport, settings.repository());

        log_client_created(
            &settings.url,
            settings.max_parallel_requests,
            settings.retry_count,
        );

        Ok(Self::with_repository(
            settings.max_parallel_requests,
            Arc::new(repository),
        ))
    }

    /// 使用自定义仓库创建客户端
    pub fn with_repository(
        max_parallel_requests: usize,
        repository: Arc<dyn InstructionRepository>,
    ) -> Self {
        Self {
            limiter: TaskLimiter::new(max_parallel_requests),
            repository,
        }
    }

    fn session(&self, content: ContentItem) -> ContentSession {
        ContentSession::new(self.limiter.clone(), self.repository.clone(), content)
    }

    // ========== 单内容 ==========

    /// 针对一个内容分发一组指令，结果与指令同序
    pub async fn ask_in_context(
        &self,
        content: ContentItem,
        request: &PerceptorRequest,
        method: InstructionMethod,
        instructions: &[&str],
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<InstructionWithResult>> {
        let instructions = to_instructions(instructions);
        let classes = to_classes(classes);

        log_batch_start(method, 1, instructions.len());

        let outcomes = self
            .session(content)
            .process(request, method, &instructions, &classes, cancel)
            .await?;
        let results: Vec<InstructionWithResult> =
            outcomes.into_iter().map(InstructionWithResult::from).collect();

        log_batch_complete(method, &results);
        Ok(results)
    }

    /// 只有一条指令的请求，调度器没有返回结果时视为未知错误
    async fn ask_single_in_context(
        &self,
        content: ContentItem,
        request: &PerceptorRequest,
        method: InstructionMethod,
        instruction: &str,
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<InstructionWithResult> {
        let results = self
            .ask_in_context(content, request, method, &[instruction], classes, cancel)
            .await?;

        Ok(results
            .into_iter()
            .next()
            .unwrap_or_else(|| InstructionWithResult::error(instruction, &InstructionError::Unknown)))
    }

    /// 针对文本提问
    pub async fn ask_text(
        &self,
        text: &str,
        request: &PerceptorRequest,
        instructions: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<InstructionWithResult>> {
        self.ask_in_context(
            ContentItem::text(text),
            request,
            InstructionMethod::Question,
            instructions,
            &[],
            cancel,
        )
        .await
    }

    /// 对文本分类，`classes` 至少两个
    pub async fn classify_text(
        &self,
        text: &str,
        request: &PerceptorRequest,
        instruction: &str,
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<InstructionWithResult> {
        self.ask_single_in_context(
            ContentItem::text(text),
            request,
            InstructionMethod::Classify,
            instruction,
            classes,
            cancel,
        )
        .await
    }

    /// 针对图片字节提问，`file_type` 为 png/jpg/jpeg
    pub async fn ask_image_bytes(
        &self,
        bytes: &[u8],
        file_type: &str,
        request: &PerceptorRequest,
        instructions: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<InstructionWithResult>> {
        let content = image_mapper::map_from_bytes(bytes, file_type)?;
        self.ask_in_context(
            content,
            request,
            InstructionMethod::Question,
            instructions,
            &[],
            cancel,
        )
        .await
    }

    /// 对图片字节分类
    pub async fn classify_image_bytes(
        &self,
        bytes: &[u8],
        file_type: &str,
        request: &PerceptorRequest,
        instruction: &str,
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<InstructionWithResult> {
        let content = image_mapper::map_from_bytes(bytes, file_type)?;
        self.ask_single_in_context(
            content,
            request,
            InstructionMethod::Classify,
            instruction,
            classes,
            cancel,
        )
        .await
    }

    /// 针对图片文件提问
    pub async fn ask_image_file(
        &self,
        path: impl AsRef<Path>,
        request: &PerceptorRequest,
        instructions: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<InstructionWithResult>> {
        let content = image_mapper::map_from_file(path).await?;
        self.ask_in_context(
            content,
            request,
            InstructionMethod::Question,
            instructions,
            &[],
            cancel,
        )
        .await
    }

    /// 对图片文件分类
    pub async fn classify_image_file(
        &self,
        path: impl AsRef<Path>,
        request: &PerceptorRequest,
        instruction: &str,
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<InstructionWithResult> {
        let content = image_mapper::map_from_file(path).await?;
        self.ask_single_in_context(
            content,
            request,
            InstructionMethod::Classify,
            instruction,
            classes,
            cancel,
        )
        .await
    }

    /// 从图片字节中提取表格
    pub async fn ask_table_from_image_bytes(
        &self,
        bytes: &[u8],
        file_type: &str,
        request: &PerceptorRequest,
        instruction: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<InstructionWithResult> {
        let content = image_mapper::map_from_bytes(bytes, file_type)?;
        self.ask_single_in_context(
            content,
            request,
            InstructionMethod::Table,
            instruction,
            &[],
            cancel,
        )
        .await
    }

    /// 从图片文件中提取表格
    pub async fn ask_table_from_image_file(
        &self,
        path: impl AsRef<Path>,
        request: &PerceptorRequest,
        instruction: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<InstructionWithResult> {
        let content = image_mapper::map_from_file(path).await?;
        self.ask_single_in_context(
            content,
            request,
            InstructionMethod::Table,
            instruction,
            &[],
            cancel,
        )
        .await
    }

    // ========== 多内容 ==========

    /// 针对多个内容分发同一组指令，结果与内容同序
    pub async fn ask_in_multiple_contexts(
        &self,
        contents: Vec<ContentItem>,
        request: &PerceptorRequest,
        method: InstructionMethod,
        instructions: &[&str],
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        let instructions = to_instructions(instructions);
        let classes = to_classes(classes);

        log_batch_start(method, contents.len(), instructions.len());

        let sessions: Vec<ContentSession> =
            contents.into_iter().map(|c| self.session(c)).collect();
        let pages = multi_context::process_many(
            &sessions,
            request,
            method,
            &instructions,
            &classes,
            cancel,
        )
        .await?;

        log_batch_complete(method, pages.iter().flat_map(|p| &p.results));
        Ok(pages)
    }

    /// 针对多张图片（例如文档的每一页）提问
    pub async fn ask_document_images(
        &self,
        pages: Vec<ContentItem>,
        request: &PerceptorRequest,
        instructions: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        self.ask_in_multiple_contexts(
            pages,
            request,
            InstructionMethod::Question,
            instructions,
            &[],
            cancel,
        )
        .await
    }

    /// 对多张图片分类
    pub async fn classify_document_images(
        &self,
        pages: Vec<ContentItem>,
        request: &PerceptorRequest,
        instruction: &str,
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        self.ask_in_multiple_contexts(
            pages,
            request,
            InstructionMethod::Classify,
            &[instruction],
            classes,
            cancel,
        )
        .await
    }

    /// 从多张图片中提取表格
    pub async fn ask_table_from_document_images(
        &self,
        pages: Vec<ContentItem>,
        request: &PerceptorRequest,
        instruction: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        self.ask_in_multiple_contexts(
            pages,
            request,
            InstructionMethod::Table,
            &[instruction],
            &[],
            cancel,
        )
        .await
    }

    /// 针对多个图片文件提问
    pub async fn ask_document_image_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        request: &PerceptorRequest,
        instructions: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        let pages = image_mapper::map_from_files(paths).await?;
        self.ask_document_images(pages, request, instructions, cancel)
            .await
    }

    /// 对多个图片文件分类
    pub async fn classify_document_image_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        request: &PerceptorRequest,
        instruction: &str,
        classes: &[&str],
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        let pages = image_mapper::map_from_files(paths).await?;
        self.classify_document_images(pages, request, instruction, classes, cancel)
            .await
    }

    /// 从多个图片文件中提取表格
    pub async fn ask_table_from_document_image_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        request: &PerceptorRequest,
        instruction: &str,
        cancel: &CancellationToken,
    ) -> ClientResult<Vec<DocumentImageResult>> {
        let pages = image_mapper::map_from_files(paths).await?;
        self.ask_table_from_document_images(pages, request, instruction, cancel)
            .await
    }
}

fn to_instructions(texts: &[&str]) -> Vec<Instruction> {
    texts.iter().map(|t| Instruction::new(*t)).collect()
}

fn to_classes(values: &[&str]) -> Vec<ClassificationEntry> {
    values.iter().map(|v| ClassificationEntry::new(*v)).collect()
}
