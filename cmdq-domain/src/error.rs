//! 领域层统一错误定义
//!
//! 聚焦命令校验、状态流转、查找失败与内部簿记异常等最小必要集合，
//! 便于在应用层与接口层统一转换为对应的错误类别。
//!
use thiserror::Error;

/// 统一错误类型（队列核心最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 输入校验 ---
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    // --- 查找/状态 ---
    #[error("not found: {reason}")]
    NotFound { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    // --- 协作层 ---
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    // --- 通用 ---
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl DomainError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::NotFound {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
