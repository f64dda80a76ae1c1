//! 队列管理（QueueManager）
//!
//! 持有待处理与处理中的命令，负责：
//! - 入队时分配顺序标识（`enqueue`）；
//! - 按优先级选出下一条命令并转为处理中（`dispatch_next`）；
//! - 为完成上报查找/移出处理中的命令（`find_processing`/`settle`）。
//!
//! 待处理集合以 `(Reverse(priority), id)` 为键的有序映射保存：
//! 最高优先级在前，同优先级按入队顺序（id 递增）稳定排列，无需每次派发全量排序。
//!
//! 本类型不加锁，并发安全由 [`Scheduler`](crate::scheduler::Scheduler) 统一保证。
//!
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::command::{CommandStatus, CompletionReport, NewCommand, QueuedCommand};
use crate::error::{DomainError, DomainResult};
use crate::value_object::{CommandId, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingKey {
    priority: Reverse<Priority>,
    id: CommandId,
}

impl PendingKey {
    fn of(cmd: &QueuedCommand) -> Self {
        Self {
            priority: Reverse(cmd.priority()),
            id: cmd.id(),
        }
    }
}

/// 入队回执
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueReceipt {
    pub id: CommandId,
    /// 入队后待处理集合的大小
    pub queue_size: usize,
}

#[derive(Debug, Default)]
pub struct QueueManager {
    last_id: CommandId,
    pending: BTreeMap<PendingKey, QueuedCommand>,
    processing: HashMap<CommandId, QueuedCommand>,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验并入队；名称非法时返回 `Validation` 且不消耗标识
    pub fn enqueue(&mut self, new: NewCommand, now: DateTime<Utc>) -> DomainResult<EnqueueReceipt> {
        let id = self.last_id.next();
        let cmd = QueuedCommand::pending(id, new, now)?;
        self.last_id = id;

        debug!(
            id = %id,
            command = %cmd.name(),
            priority = cmd.priority().value(),
            source = cmd.source(),
            "command enqueued"
        );
        self.pending.insert(PendingKey::of(&cmd), cmd);

        Ok(EnqueueReceipt {
            id,
            queue_size: self.pending.len(),
        })
    }

    /// 取出最高优先级的待处理命令并转为处理中；队列为空时返回 `None`
    pub fn dispatch_next(&mut self, now: DateTime<Utc>) -> DomainResult<Option<QueuedCommand>> {
        let Some(mut entry) = self.pending.first_entry() else {
            return Ok(None);
        };

        // start 失败时命令原样留在待处理集合中
        entry.get_mut().start(now)?;
        let cmd = entry.remove();

        debug!(id = %cmd.id(), command = %cmd.name(), "command dispatched");
        self.processing.insert(cmd.id(), cmd.clone());

        Ok(Some(cmd))
    }

    /// 仅匹配处理中的命令
    pub fn find_processing(&self, id: CommandId) -> DomainResult<&QueuedCommand> {
        self.processing
            .get(&id)
            .filter(|cmd| cmd.status() == CommandStatus::Processing)
            .ok_or_else(|| Self::not_processing(id))
    }

    /// 以上报结果结束处理中的命令，并将其移出处理中集合
    pub fn settle(
        &mut self,
        id: CommandId,
        report: CompletionReport,
        now: DateTime<Utc>,
    ) -> DomainResult<QueuedCommand> {
        let cmd = self
            .processing
            .get_mut(&id)
            .filter(|cmd| cmd.status() == CommandStatus::Processing)
            .ok_or_else(|| Self::not_processing(id))?;

        let status = cmd.finish(report, now)?;
        debug!(id = %id, status = %status, "command settled");

        self.processing
            .remove(&id)
            .ok_or_else(|| DomainError::internal(format!("command {id} vanished while settling")))
    }

    /// 开始时间早于 `deadline` 的处理中命令（按 id 升序）
    pub fn expired_processing(&self, deadline: DateTime<Utc>) -> Vec<CommandId> {
        let mut ids: Vec<CommandId> = self
            .processing
            .values()
            .filter(|cmd| cmd.started_at().is_some_and(|at| at < deadline))
            .map(QueuedCommand::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn processing_len(&self) -> usize {
        self.processing.len()
    }

    /// 累计入队数量（即最近一次分配的 id）
    pub fn total_enqueued(&self) -> u64 {
        self.last_id.value()
    }

    fn not_processing(id: CommandId) -> DomainError {
        DomainError::not_found(format!("command {id} not found or already completed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn new_cmd(name: &str, priority: i64) -> NewCommand {
        NewCommand::builder().name(name).priority(priority).build()
    }

    #[test]
    fn ids_are_sequential_and_receipt_counts_pending() {
        let mut q = QueueManager::new();
        let now = Utc::now();
        let a = q.enqueue(new_cmd("a", 0), now).unwrap();
        let b = q.enqueue(new_cmd("b", 0), now).unwrap();
        assert_eq!(a.id, CommandId::new(1));
        assert_eq!(b.id, CommandId::new(2));
        assert_eq!(a.queue_size, 1);
        assert_eq!(b.queue_size, 2);
        assert_eq!(q.total_enqueued(), 2);
    }

    #[test]
    fn invalid_enqueue_does_not_consume_an_id() {
        let mut q = QueueManager::new();
        let now = Utc::now();
        assert!(q.enqueue(new_cmd("", 0), now).is_err());
        assert_eq!(q.pending_len(), 0);
        assert_eq!(q.total_enqueued(), 0);
        assert_eq!(q.enqueue(new_cmd("ok", 0), now).unwrap().id, CommandId::new(1));
    }

    #[test]
    fn dispatch_orders_by_priority_then_enqueue_order() {
        let mut q = QueueManager::new();
        let now = Utc::now();
        for (name, p) in [("first-5", 5), ("one", 1), ("second-5", 5), ("three", 3)] {
            q.enqueue(new_cmd(name, p), now).unwrap();
        }

        let order: Vec<String> = std::iter::from_fn(|| q.dispatch_next(now).unwrap())
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(order, ["first-5", "second-5", "three", "one"]);
        assert_eq!(q.processing_len(), 4);
    }

    #[test]
    fn negative_priorities_sort_below_default() {
        let mut q = QueueManager::new();
        let now = Utc::now();
        q.enqueue(new_cmd("low", -1), now).unwrap();
        q.enqueue(new_cmd("default", 0), now).unwrap();
        assert_eq!(q.dispatch_next(now).unwrap().unwrap().name().as_str(), "default");
    }

    #[test]
    fn dispatch_on_empty_is_none() {
        let mut q = QueueManager::new();
        assert!(q.dispatch_next(Utc::now()).unwrap().is_none());
    }

    #[test]
    fn find_processing_ignores_pending_commands() {
        let mut q = QueueManager::new();
        let now = Utc::now();
        let id = q.enqueue(new_cmd("a", 0), now).unwrap().id;
        assert!(matches!(
            q.find_processing(id),
            Err(DomainError::NotFound { .. })
        ));

        q.dispatch_next(now).unwrap();
        assert_eq!(q.find_processing(id).unwrap().status(), CommandStatus::Processing);
    }

    #[test]
    fn settle_removes_from_processing_once() {
        let mut q = QueueManager::new();
        let now = Utc::now();
        let id = q.enqueue(new_cmd("a", 0), now).unwrap().id;
        q.dispatch_next(now).unwrap();

        let done = q.settle(id, CompletionReport::success("ok"), now).unwrap();
        assert_eq!(done.status(), CommandStatus::Completed);
        assert_eq!(q.processing_len(), 0);

        let err = q.settle(id, CompletionReport::success("ok"), now).unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[test]
    fn expired_processing_uses_started_at() {
        let mut q = QueueManager::new();
        let t0 = Utc::now();
        q.enqueue(new_cmd("a", 0), t0).unwrap();
        q.enqueue(new_cmd("b", 0), t0).unwrap();
        q.dispatch_next(t0).unwrap();
        q.dispatch_next(t0 + TimeDelta::seconds(30)).unwrap();

        let expired = q.expired_processing(t0 + TimeDelta::seconds(10));
        assert_eq!(expired, vec![CommandId::new(1)]);
        assert!(q.expired_processing(t0).is_empty());
    }
}
