//! 调度器（Scheduler）
//!
//! 进程内唯一的状态所有者：将 [`QueueManager`] 与 [`CompletionLedger`] 放在同一把互斥锁之后，
//! 每个操作在持锁期间完成完整的“读-改-写”，因此：
//! - 并发派发不会选中同一条命令；
//! - 入队/派发/上报要么完全生效，要么不留下任何可见修改。
//!
//! 锁中毒会以 `DomainError::Internal` 暴露，不会 panic。
//!
use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

use crate::command::{CompletionReport, NewCommand, QueuedCommand};
use crate::error::{DomainError, DomainResult};
use crate::ledger::{CompletionLedger, DEFAULT_LEDGER_CAPACITY};
use crate::queue::{EnqueueReceipt, QueueManager};
use crate::value_object::CommandId;

/// 调度器配置
#[derive(Builder, Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// 完成账本容量
    #[builder(default = DEFAULT_LEDGER_CAPACITY)]
    pub ledger_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 进程级计数（只读快照）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub total_enqueued: u64,
}

#[derive(Debug)]
struct SchedulerState {
    queue: QueueManager,
    ledger: CompletionLedger,
}

#[derive(Debug)]
pub struct Scheduler {
    state: Mutex<SchedulerState>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                queue: QueueManager::new(),
                ledger: CompletionLedger::with_capacity(config.ledger_capacity),
            }),
        }
    }

    fn lock(&self) -> DomainResult<MutexGuard<'_, SchedulerState>> {
        self.state
            .lock()
            .map_err(|_| DomainError::internal("scheduler state lock poisoned"))
    }

    pub fn enqueue(&self, new: NewCommand) -> DomainResult<EnqueueReceipt> {
        self.enqueue_at(new, Utc::now())
    }

    pub fn enqueue_at(&self, new: NewCommand, now: DateTime<Utc>) -> DomainResult<EnqueueReceipt> {
        self.lock()?.queue.enqueue(new, now)
    }

    /// 派发下一条命令；队列为空时返回 `Ok(None)`
    pub fn dispatch_next(&self) -> DomainResult<Option<QueuedCommand>> {
        self.dispatch_next_at(Utc::now())
    }

    pub fn dispatch_next_at(&self, now: DateTime<Utc>) -> DomainResult<Option<QueuedCommand>> {
        self.lock()?.queue.dispatch_next(now)
    }

    /// 严格上报：命令必须处于处理中，否则返回 `NotFound`
    pub fn record_result(
        &self,
        id: CommandId,
        report: CompletionReport,
    ) -> DomainResult<QueuedCommand> {
        self.record_result_at(id, report, Utc::now())
    }

    pub fn record_result_at(
        &self,
        id: CommandId,
        report: CompletionReport,
        now: DateTime<Utc>,
    ) -> DomainResult<QueuedCommand> {
        let mut state = self.lock()?;
        let done = state.queue.settle(id, report, now)?;
        let evicted = state.ledger.record(done.clone());
        if evicted > 0 {
            debug!(evicted, capacity = state.ledger.capacity(), "ledger trimmed");
        }
        Ok(done)
    }

    pub fn find_processing(&self, id: CommandId) -> DomainResult<QueuedCommand> {
        self.lock()?.queue.find_processing(id).cloned()
    }

    /// 最近完成的命令（时间顺序，最近的在最后）
    pub fn recent_completions(&self, limit: Option<usize>) -> DomainResult<Vec<QueuedCommand>> {
        Ok(self.lock()?.ledger.recent(limit))
    }

    /// 清空完成账本，返回被移除的条目数
    pub fn clear_completions(&self) -> DomainResult<usize> {
        let removed = self.lock()?.ledger.clear();
        debug!(removed, "ledger cleared");
        Ok(removed)
    }

    pub fn stats(&self) -> DomainResult<QueueStats> {
        let state = self.lock()?;
        Ok(QueueStats {
            pending: state.queue.pending_len(),
            processing: state.queue.processing_len(),
            completed: state.ledger.len(),
            total_enqueued: state.queue.total_enqueued(),
        })
    }

    /// 将开始时间早于 `now - timeout` 的处理中命令以失败结束并写入账本
    ///
    /// 状态仍只向前流转：超时命令不会回到待处理集合。
    pub fn reclaim_expired(
        &self,
        timeout: Duration,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<CommandId>> {
        let deadline = TimeDelta::from_std(timeout)
            .ok()
            .and_then(|delta| now.checked_sub_signed(delta))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "visibility timeout of {}s is out of range",
                    timeout.as_secs()
                ))
            })?;

        let mut state = self.lock()?;
        let expired = state.queue.expired_processing(deadline);

        for id in &expired {
            let report = CompletionReport::failure(json!({
                "reason": "visibility timeout exceeded",
                "timeoutSecs": timeout.as_secs(),
            }));
            let done = state.queue.settle(*id, report, now)?;
            state.ledger.record(done);
            warn!(id = %id, timeout_secs = timeout.as_secs(), "processing command expired");
        }

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandStatus;

    #[test]
    fn record_result_moves_command_into_ledger() {
        let s = Scheduler::default();
        let id = s
            .enqueue(NewCommand::builder().name("ping").build())
            .unwrap()
            .id;
        s.dispatch_next().unwrap();

        let done = s.record_result(id, CompletionReport::success("ok")).unwrap();
        assert_eq!(done.status(), CommandStatus::Completed);

        let stats = s.stats().unwrap();
        assert_eq!(
            stats,
            QueueStats {
                pending: 0,
                processing: 0,
                completed: 1,
                total_enqueued: 1,
            }
        );
    }

    #[test]
    fn orphan_report_is_not_found() {
        let s = Scheduler::default();
        let err = s
            .record_result(CommandId::new(99), CompletionReport::success("ok"))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn clear_keeps_live_sets() {
        let s = Scheduler::default();
        let a = s.enqueue(NewCommand::builder().name("a").build()).unwrap().id;
        s.enqueue(NewCommand::builder().name("b").build()).unwrap();
        s.enqueue(NewCommand::builder().name("c").build()).unwrap();
        s.dispatch_next().unwrap();
        s.dispatch_next().unwrap();
        s.record_result(a, CompletionReport::default()).unwrap();

        assert_eq!(s.clear_completions().unwrap(), 1);
        let stats = s.stats().unwrap();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.total_enqueued, 3);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let s = Scheduler::default();
        s.enqueue(NewCommand::builder().name("a").build()).unwrap();
        s.clear_completions().unwrap();
        let next = s.enqueue(NewCommand::builder().name("b").build()).unwrap();
        assert_eq!(next.id, CommandId::new(2));
    }

    #[test]
    fn reclaim_expires_stale_processing_as_failed() {
        let s = Scheduler::default();
        let t0 = Utc::now();
        let id = s
            .enqueue_at(NewCommand::builder().name("slow").build(), t0)
            .unwrap()
            .id;
        s.dispatch_next_at(t0).unwrap();

        let timeout = Duration::from_secs(60);
        assert!(
            s.reclaim_expired(timeout, t0 + TimeDelta::seconds(59))
                .unwrap()
                .is_empty()
        );

        let reclaimed = s
            .reclaim_expired(timeout, t0 + TimeDelta::seconds(61))
            .unwrap();
        assert_eq!(reclaimed, vec![id]);

        let recent = s.recent_completions(None).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].status(), CommandStatus::Failed);
        assert_eq!(recent[0].error().unwrap()["timeoutSecs"], 60);

        // 超时后迟到的上报被拒绝
        assert!(matches!(
            s.record_result(id, CompletionReport::success("late")),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn oversized_visibility_timeout_is_rejected() {
        let s = Scheduler::default();
        s.enqueue(NewCommand::builder().name("slow").build()).unwrap();
        s.dispatch_next().unwrap();

        let err = s
            .reclaim_expired(Duration::from_secs(10_000_000_000_000), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));

        let stats = s.stats().unwrap();
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.completed, 0);
    }
}
