//! 数据传输对象（DTO）
//!
//! - 作为应用层的输出载体，面向接口/外部系统序列化友好；
//! - 字段统一使用 camelCase，与执行端（bridge）约定的线上格式保持一致。
//!
use cmdq_domain::{CommandId, QueueStats, QueuedCommand};
use serde::Serialize;

/// 数据传输对象标记 trait
pub trait Dto: Serialize + Send + Sync + 'static {}

/// 入队回执
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueReceiptDto {
    pub success: bool,
    pub id: CommandId,
    pub queue_size: usize,
}

impl Dto for EnqueueReceiptDto {}

/// 派发结果：`{command: ...}` 或 `{empty: true}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchDto {
    Dispatched { command: QueuedCommand },
    Empty { empty: bool },
}

impl DispatchDto {
    pub fn empty() -> Self {
        Self::Empty { empty: true }
    }

    pub fn command(&self) -> Option<&QueuedCommand> {
        match self {
            Self::Dispatched { command } => Some(command),
            Self::Empty { .. } => None,
        }
    }
}

impl Dto for DispatchDto {}

/// 完成上报回执
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportAckDto {
    pub success: bool,
    pub id: CommandId,
}

impl Dto for ReportAckDto {}

/// 清空账本回执
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearedDto {
    pub success: bool,
    pub cleared: usize,
}

impl Dto for ClearedDto {}

/// 最近完成的命令（时间顺序，最近的在最后）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentCompletionsDto {
    pub commands: Vec<QueuedCommand>,
    pub count: usize,
}

impl Dto for RecentCompletionsDto {}

/// 队列计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusDto {
    pub queue_length: usize,
    pub processing_count: usize,
    pub completed_count: usize,
    pub total_processed: u64,
}

impl From<QueueStats> for QueueStatusDto {
    fn from(stats: QueueStats) -> Self {
        Self {
            queue_length: stats.pending,
            processing_count: stats.processing,
            completed_count: stats.completed,
            total_processed: stats.total_enqueued,
        }
    }
}

impl Dto for QueueStatusDto {}
