use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cmdq_application::error::{AppError, ErrorKind};
use cmdq_domain::DomainError;
use serde_json::json;
use std::fmt;

pub type HttpResult<T> = Result<T, HttpError>;

/// 接口层错误：响应体统一为 `{"error": "<message>"}`
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        let message = match &err {
            AppError::Domain(
                DomainError::Validation { reason }
                | DomainError::NotFound { reason }
                | DomainError::Unauthorized { reason },
            ) => reason.clone(),
            other => other.to_string(),
        };

        match err.kind() {
            ErrorKind::BadRequest => Self::bad_request(message),
            ErrorKind::NotFound => Self::not_found(message),
            ErrorKind::Unauthorized => Self::unauthorized(message),
            ErrorKind::Internal => {
                tracing::error!(error = %err, "queue operation failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<DomainError> for HttpError {
    fn from(err: DomainError) -> Self {
        AppError::from(err).into()
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let bad: HttpError = DomainError::validation("command required").into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "command required");

        let missing: HttpError = DomainError::not_found("command 3 not found").into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let denied: HttpError = DomainError::Unauthorized {
            reason: "missing token".into(),
        }
        .into();
        assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
        assert_eq!(denied.message, "missing token");
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err: HttpError = DomainError::internal("scheduler state lock poisoned").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
