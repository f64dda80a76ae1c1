//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装命令标识、名称与优先级等概念性值及其校验逻辑。
//!

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 命令标识
///
/// 入队时按顺序分配，单调递增且永不复用；是完成上报时唯一的交叉引用。
///
/// # 示例
///
/// ```
/// use cmdq_domain::value_object::CommandId;
///
/// let first = CommandId::default().next();
/// assert_eq!(first.value(), 1);
/// assert!(first.next() > first);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(u64);

impl CommandId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// 获取下一个标识
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommandId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::validation(format!("invalid command id `{s}`: {e}")))?;
        Ok(Self(value))
    }
}

impl From<u64> for CommandId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// 命令名称：创建时必填，不可为空（忽略首尾空白后判断），之后不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandName(String);

impl CommandName {
    /// 校验并创建命令名称
    ///
    /// ```
    /// use cmdq_domain::value_object::CommandName;
    ///
    /// assert_eq!(CommandName::new("ping").unwrap().as_str(), "ping");
    /// assert!(CommandName::new("   ").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = Self(name.into());
        name.validate()?;
        Ok(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for CommandName {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.trim().is_empty() {
            return Err(DomainError::validation("command required"));
        }
        Ok(())
    }
}

impl TryFrom<String> for CommandName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CommandName> for String {
    fn from(value: CommandName) -> Self {
        value.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 调度优先级：数值越大越先被派发，默认 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(i64);

impl Priority {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_id_parses_and_orders() {
        let id: CommandId = " 42 ".parse().unwrap();
        assert_eq!(id, CommandId::new(42));
        assert!(id.next() > id);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn command_id_rejects_garbage() {
        let err = "abc".parse::<CommandId>().unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!("-1".parse::<CommandId>().is_err());
    }

    #[test]
    fn command_name_rejects_blank() {
        for bad in ["", " ", "\t\n"] {
            let err = CommandName::new(bad).unwrap_err();
            match err {
                DomainError::Validation { reason } => assert_eq!(reason, "command required"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn command_name_serde_is_validated() {
        let name: CommandName = serde_json::from_str("\"alert\"").unwrap();
        assert_eq!(name.as_str(), "alert");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"alert\"");
        assert!(serde_json::from_str::<CommandName>("\"\"").is_err());
    }

    #[test]
    fn priority_orders_by_value() {
        assert!(Priority::new(10) > Priority::default());
        assert_eq!(serde_json::to_string(&Priority::new(-3)).unwrap(), "-3");
    }
}
