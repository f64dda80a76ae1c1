//! 队列用例处理器
//!
//! 将应用层命令/查询翻译为对 [`Scheduler`] 的调用，并把结果组装为 DTO。
//! 本处理器不做任何重试：执行端在收到 `empty` 后自行再次轮询，生产者在校验失败后自行重新提交。
//!
use async_trait::async_trait;
use cmdq_domain::{CompletionReport, NewCommand, Scheduler};
use std::sync::Arc;
use tracing::{debug, info};

use crate::command::CommandHandler;
use crate::commands::{ClearCompletions, DispatchNext, EnqueueCommand, ReportCompletion};
use crate::context::AppContext;
use crate::dto::{
    ClearedDto, DispatchDto, EnqueueReceiptDto, QueueStatusDto, RecentCompletionsDto, ReportAckDto,
};
use crate::error::AppError;
use crate::queries::{QueueStatus, RecentCompletions};
use crate::query::QueryHandler;

pub struct QueueHandler {
    scheduler: Arc<Scheduler>,
}

impl QueueHandler {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl CommandHandler<EnqueueCommand> for QueueHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: EnqueueCommand,
    ) -> Result<EnqueueReceiptDto, AppError> {
        let new = NewCommand::builder()
            .name(cmd.name.unwrap_or_default())
            .maybe_args(cmd.args)
            .maybe_source(cmd.source)
            .maybe_priority(cmd.priority)
            .build();

        let receipt = self.scheduler.enqueue(new)?;
        info!(
            id = %receipt.id,
            queue_size = receipt.queue_size,
            actor = ctx.actor().unwrap_or("-"),
            "command accepted"
        );

        Ok(EnqueueReceiptDto {
            success: true,
            id: receipt.id,
            queue_size: receipt.queue_size,
        })
    }
}

#[async_trait]
impl CommandHandler<DispatchNext> for QueueHandler {
    async fn handle(&self, ctx: &AppContext, _cmd: DispatchNext) -> Result<DispatchDto, AppError> {
        match self.scheduler.dispatch_next()? {
            Some(command) => {
                info!(
                    id = %command.id(),
                    command = %command.name(),
                    actor = ctx.actor().unwrap_or("-"),
                    "command handed to bridge"
                );
                Ok(DispatchDto::Dispatched { command })
            }
            None => {
                debug!("dispatch requested on empty queue");
                Ok(DispatchDto::empty())
            }
        }
    }
}

#[async_trait]
impl CommandHandler<ReportCompletion> for QueueHandler {
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: ReportCompletion,
    ) -> Result<ReportAckDto, AppError> {
        let report = CompletionReport::builder()
            .maybe_result(cmd.result)
            .maybe_error(cmd.error)
            .build();

        let done = self.scheduler.record_result(cmd.id, report)?;
        info!(
            id = %done.id(),
            status = %done.status(),
            actor = ctx.actor().unwrap_or("-"),
            "completion recorded"
        );

        Ok(ReportAckDto {
            success: true,
            id: done.id(),
        })
    }
}

#[async_trait]
impl CommandHandler<ClearCompletions> for QueueHandler {
    async fn handle(&self, _ctx: &AppContext, _cmd: ClearCompletions) -> Result<ClearedDto, AppError> {
        let cleared = self.scheduler.clear_completions()?;
        info!(cleared, "completion ledger cleared");
        Ok(ClearedDto {
            success: true,
            cleared,
        })
    }
}

#[async_trait]
impl QueryHandler<RecentCompletions> for QueueHandler {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: RecentCompletions,
    ) -> Result<RecentCompletionsDto, AppError> {
        let commands = self.scheduler.recent_completions(q.limit)?;
        Ok(RecentCompletionsDto {
            count: commands.len(),
            commands,
        })
    }
}

#[async_trait]
impl QueryHandler<QueueStatus> for QueueHandler {
    async fn handle(&self, _ctx: &AppContext, _q: QueueStatus) -> Result<QueueStatusDto, AppError> {
        Ok(self.scheduler.stats()?.into())
    }
}
