use cmdq_domain::error::DomainError;

/// 错误类别：接口层据此选择响应状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Unauthorized,
    Internal,
}

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => ErrorKind::BadRequest,
                DomainError::NotFound { .. } => ErrorKind::NotFound,
                DomainError::Unauthorized { .. } => ErrorKind::Unauthorized,
                _ => ErrorKind::Internal,
            },
            AppError::HandlerNotFound(_)
            | AppError::AlreadyRegisteredCommand { .. }
            | AppError::AlreadyRegisteredQuery { .. }
            | AppError::TypeMismatch { .. } => ErrorKind::Internal,
        }
    }
}
