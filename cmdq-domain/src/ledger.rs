//! 完成账本（CompletionLedger）
//!
//! 记录已进入终态（completed/failed）的命令：
//! - 按上报先后顺序追加，读取时保持时间顺序（最近的在最后）；
//! - 超出容量后静默丢弃最早的条目，不做归档；
//! - `clear` 只清空账本，不影响待处理与处理中集合。
//!
use std::collections::VecDeque;
use tracing::debug;

use crate::command::QueuedCommand;

/// 账本默认容量
pub const DEFAULT_LEDGER_CAPACITY: usize = 100;

#[derive(Debug)]
pub struct CompletionLedger {
    capacity: usize,
    entries: VecDeque<QueuedCommand>,
}

impl Default for CompletionLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }
}

impl CompletionLedger {
    /// 创建账本，容量至少为 1
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 追加终态命令，返回因超出容量被淘汰的条目数
    pub fn record(&mut self, cmd: QueuedCommand) -> usize {
        debug_assert!(cmd.status().is_terminal(), "ledger only holds terminal commands");

        self.entries.push_back(cmd);

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            if let Some(old) = self.entries.pop_front() {
                debug!(id = %old.id(), "ledger entry evicted");
                evicted += 1;
            }
        }
        evicted
    }

    /// 最近的 `limit` 条记录（时间顺序，最近的在最后）；`None` 表示按容量返回
    pub fn recent(&self, limit: Option<usize>) -> Vec<QueuedCommand> {
        let limit = limit.unwrap_or(self.capacity).min(self.entries.len());
        let skip = self.entries.len() - limit;
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空账本，返回被移除的条目数
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }
}
