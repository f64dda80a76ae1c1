//! 命令派发队列领域层（cmdq-domain）
//!
//! 单节点、纯内存的命令派发队列：生产者提交带参数与优先级的命名命令，
//! 外部执行端（bridge）轮询取出下一条命令、在进程外执行后回报完成或失败。
//!
//! - 命令模型与生命周期（`command`）、值对象（`value_object`）
//! - 队列管理：标识分配、优先级选择、pending -> processing（`queue`）
//! - 完成账本：有界终态记录，最早优先淘汰（`ledger`）
//! - 调度器：以单把互斥锁串行化全部状态修改（`scheduler`）
//! - 可选的处理中超时回收引擎（`reclaim`，需启用 `reclaim` 特性）
//!
//! 典型用法：
//! 1. 创建 `Scheduler`（可通过 `SchedulerConfig` 指定账本容量）；
//! 2. 生产者调用 `enqueue`，执行端调用 `dispatch_next` 与 `record_result`；
//! 3. 按需启动 `ReclaimEngine`，为未上报的处理中命令设置可见性超时。
//!
pub mod command;
pub mod error;
pub mod ledger;
pub mod queue;
#[cfg(feature = "reclaim")]
pub mod reclaim;
pub mod scheduler;
pub mod value_object;

pub use command::{CommandStatus, CompletionReport, NewCommand, QueuedCommand};
pub use error::{DomainError, DomainResult};
pub use queue::EnqueueReceipt;
pub use scheduler::{QueueStats, Scheduler, SchedulerConfig};
pub use value_object::{CommandId, CommandName, Priority};
