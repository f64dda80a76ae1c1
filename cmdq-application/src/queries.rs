use crate::dto::{QueueStatusDto, RecentCompletionsDto};
use crate::query::Query;

/// 最近完成的命令；`limit` 为空时按账本容量返回
#[derive(Debug, Clone, Copy, Default)]
pub struct RecentCompletions {
    pub limit: Option<usize>,
}

impl Query for RecentCompletions {
    const NAME: &'static str = "queue.recent_completions";
    type Dto = RecentCompletionsDto;
}

/// 进程级计数，只读无副作用
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueStatus;

impl Query for QueueStatus {
    const NAME: &'static str = "queue.status";
    type Dto = QueueStatusDto;
}
