//! 队列写操作命令
//!
//! 生产者提交 `EnqueueCommand`；执行端依次发出 `DispatchNext` 与 `ReportCompletion`；
//! 运维侧可发出 `ClearCompletions` 清空完成账本。
//!
use cmdq_domain::CommandId;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::command::Command;
use crate::dto::{ClearedDto, DispatchDto, EnqueueReceiptDto, ReportAckDto};

/// 提交一条命令；`name` 缺失或为空时由领域层拒绝
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnqueueCommand {
    #[serde(rename = "command")]
    pub name: Option<String>,
    pub args: Option<Map<String, Value>>,
    pub source: Option<String>,
    pub priority: Option<i64>,
}

impl Command for EnqueueCommand {
    const NAME: &'static str = "queue.enqueue";
    type Output = EnqueueReceiptDto;
}

/// 取出下一条待处理命令（队列为空不视为错误）
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchNext;

impl Command for DispatchNext {
    const NAME: &'static str = "queue.dispatch_next";
    type Output = DispatchDto;
}

/// 执行端上报执行结果（严格模式：命令必须处于处理中）
#[derive(Debug, Clone)]
pub struct ReportCompletion {
    pub id: CommandId,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

impl Command for ReportCompletion {
    const NAME: &'static str = "queue.report_completion";
    type Output = ReportAckDto;
}

/// 清空完成账本，不影响待处理与处理中集合
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearCompletions;

impl Command for ClearCompletions {
    const NAME: &'static str = "queue.clear_completions";
    type Output = ClearedDto;
}
