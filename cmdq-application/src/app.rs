//! 应用装配（QueueApp）
//!
//! 以同一个 [`Scheduler`] 构建命令总线与查询总线，并注册全部队列用例处理器。
//!
use cmdq_domain::Scheduler;
use std::sync::Arc;

use crate::commands::{ClearCompletions, DispatchNext, EnqueueCommand, ReportCompletion};
use crate::error::AppError;
use crate::queries::{QueueStatus, RecentCompletions};
use crate::queue_handler::QueueHandler;
use crate::{InMemoryCommandBus, InMemoryQueryBus};

pub struct QueueApp {
    commands: InMemoryCommandBus,
    queries: InMemoryQueryBus,
}

impl QueueApp {
    pub fn new(scheduler: Arc<Scheduler>) -> Result<Self, AppError> {
        let handler = Arc::new(QueueHandler::new(scheduler));

        let commands = InMemoryCommandBus::new();
        commands.register::<EnqueueCommand, _>(handler.clone())?;
        commands.register::<DispatchNext, _>(handler.clone())?;
        commands.register::<ReportCompletion, _>(handler.clone())?;
        commands.register::<ClearCompletions, _>(handler.clone())?;

        let queries = InMemoryQueryBus::new();
        queries.register::<RecentCompletions, _>(handler.clone())?;
        queries.register::<QueueStatus, _>(handler)?;

        Ok(Self { commands, queries })
    }

    pub fn commands(&self) -> &InMemoryCommandBus {
        &self.commands
    }

    pub fn queries(&self) -> &InMemoryQueryBus {
        &self.queries
    }
}
