//! 命令（QueuedCommand）与其生命周期
//!
//! 一条命令只沿 `pending -> processing -> {completed, failed}` 单向流转：
//! - `start`：派发时由待处理转为处理中；
//! - `finish`：上报完成时由处理中转为终态；
//! - 任何其他流转均返回 `DomainError::InvalidState`，且不修改命令。
//!
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{DomainError, DomainResult};
use crate::value_object::{CommandId, CommandName, Priority};

/// 未指定来源时使用的默认来源标签
pub const DEFAULT_SOURCE: &str = "unknown";

/// 命令状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl CommandStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// 是否为终态（completed/failed）
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生产者提交的入队请求（尚未校验）
///
/// ```
/// use cmdq_domain::command::NewCommand;
///
/// let new = NewCommand::builder().name("ping").priority(3).build();
/// assert_eq!(new.name(), "ping");
/// ```
#[derive(Builder, Debug, Clone, Default)]
pub struct NewCommand {
    #[builder(into)]
    name: String,
    args: Option<Map<String, Value>>,
    #[builder(into)]
    source: Option<String>,
    priority: Option<i64>,
}

impl NewCommand {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// 执行端（bridge）上报的执行结果
///
/// 当 `error` 存在且为“真值”（非 null/false/0/空串）时视为失败。
#[derive(Builder, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionReport {
    result: Option<Value>,
    error: Option<Value>,
}

impl CompletionReport {
    pub fn success(result: impl Into<Value>) -> Self {
        Self {
            result: Some(result.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<Value>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.as_ref().is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 队列中的命令（调度单元）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedCommand {
    id: CommandId,
    #[serde(rename = "command")]
    name: CommandName,
    #[serde(default)]
    args: Map<String, Value>,
    source: String,
    #[serde(default)]
    priority: Priority,
    status: CommandStatus,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl QueuedCommand {
    /// 由入队请求创建待处理命令；名称校验失败时不产生任何副作用
    pub(crate) fn pending(id: CommandId, new: NewCommand, now: DateTime<Utc>) -> DomainResult<Self> {
        let NewCommand {
            name,
            args,
            source,
            priority,
        } = new;

        Ok(Self {
            id,
            name: CommandName::new(name)?,
            args: args.unwrap_or_default(),
            source: source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            priority: Priority::new(priority.unwrap_or_default()),
            status: CommandStatus::Pending,
            created_at: now,
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        })
    }

    /// pending -> processing
    pub fn start(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.expect_status(CommandStatus::Pending, "start")?;
        self.status = CommandStatus::Processing;
        self.started_at = Some(now);
        Ok(())
    }

    /// processing -> completed | failed，返回最终状态
    pub fn finish(
        &mut self,
        report: CompletionReport,
        now: DateTime<Utc>,
    ) -> DomainResult<CommandStatus> {
        self.expect_status(CommandStatus::Processing, "finish")?;

        if report.is_failure() {
            self.status = CommandStatus::Failed;
            self.error = report.error;
            self.result = None;
        } else {
            self.status = CommandStatus::Completed;
            self.result = report.result.filter(|v| !v.is_null());
            self.error = None;
        }
        self.completed_at = Some(now);

        Ok(self.status)
    }

    fn expect_status(&self, expected: CommandStatus, transition: &str) -> DomainResult<()> {
        if self.status != expected {
            return Err(DomainError::invalid_state(format!(
                "cannot {transition} command {}: status is {}, expected {expected}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn name(&self) -> &CommandName {
        &self.name
    }

    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> CommandStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&Value> {
        self.error.as_ref()
    }
}
