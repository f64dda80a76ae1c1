//! HTTP 路由
//!
//! 生产者通过 `POST /api/queue` 提交命令；执行端轮询 `GET /api/queue/next`，
//! 执行后通过 `POST /api/queue/{id}/complete` 回报结果。
//!
use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::HeaderMap,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use cmdq_application::command::CommandBus;
use cmdq_application::commands::{ClearCompletions, DispatchNext, EnqueueCommand, ReportCompletion};
use cmdq_application::context::AppContext;
use cmdq_application::dto::{
    ClearedDto, DispatchDto, EnqueueReceiptDto, QueueStatusDto, RecentCompletionsDto, ReportAckDto,
};
use cmdq_application::queries::{QueueStatus, RecentCompletions};
use cmdq_application::query::QueryBus;
use cmdq_domain::CommandId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{HttpError, HttpResult};
use crate::state::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const REQUEST_ID_HEADER: &str = "x-request-id";
/// 调用方自描述标签（如执行端实例名），仅写入日志
const ACTOR_HEADER: &str = "x-cmdq-actor";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/queue", post(enqueue))
        .route("/api/queue/next", get(dispatch_next))
        .route("/api/queue/completed", get(recent_completions))
        .route("/api/queue/clear", post(clear_completions))
        .route("/api/queue/{id}/complete", post(complete))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn request_context(headers: &HeaderMap) -> AppContext {
    AppContext::builder()
        .maybe_correlation_id(header_value(headers, REQUEST_ID_HEADER))
        .maybe_actor(header_value(headers, ACTOR_HEADER))
        .build()
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime: f64,
    timestamp: DateTime<Utc>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "okay",
        version: VERSION,
        uptime: state.uptime_secs(),
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    version: &'static str,
    #[serde(flatten)]
    queue: QueueStatusDto,
    uptime: f64,
    timestamp: DateTime<Utc>,
}

async fn status(State(state): State<AppState>, headers: HeaderMap) -> HttpResult<Json<StatusResponse>> {
    let queue = state
        .app()
        .queries()
        .dispatch(&request_context(&headers), QueueStatus)
        .await?;

    Ok(Json(StatusResponse {
        version: VERSION,
        queue,
        uptime: state.uptime_secs(),
        timestamp: Utc::now(),
    }))
}

async fn enqueue(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<EnqueueCommand>, JsonRejection>,
) -> HttpResult<Json<EnqueueReceiptDto>> {
    let Json(cmd) = payload?;
    let receipt = state
        .app()
        .commands()
        .dispatch(&request_context(&headers), cmd)
        .await?;
    Ok(Json(receipt))
}

async fn dispatch_next(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HttpResult<Json<DispatchDto>> {
    let out = state
        .app()
        .commands()
        .dispatch(&request_context(&headers), DispatchNext)
        .await?;
    Ok(Json(out))
}

#[derive(Debug, Default, Deserialize)]
struct ReportBody {
    result: Option<Value>,
    error: Option<Value>,
}

async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> HttpResult<Json<ReportAckDto>> {
    let id: CommandId = id.parse()?;

    // 执行端可以不带请求体上报成功
    let body: ReportBody = if body.iter().all(u8::is_ascii_whitespace) {
        ReportBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| HttpError::bad_request(format!("invalid report body: {e}")))?
    };

    let ack = state
        .app()
        .commands()
        .dispatch(
            &request_context(&headers),
            ReportCompletion {
                id,
                result: body.result,
                error: body.error,
            },
        )
        .await?;
    Ok(Json(ack))
}

#[derive(Debug, Default, Deserialize)]
struct RecentParams {
    limit: Option<usize>,
}

async fn recent_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> HttpResult<Json<RecentCompletionsDto>> {
    let Query(params) = params?;
    let recent = state
        .app()
        .queries()
        .dispatch(
            &request_context(&headers),
            RecentCompletions {
                limit: params.limit,
            },
        )
        .await?;
    Ok(Json(recent))
}

async fn clear_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HttpResult<Json<ClearedDto>> {
    let cleared = state
        .app()
        .commands()
        .dispatch(&request_context(&headers), ClearCompletions)
        .await?;
    Ok(Json(cleared))
}

async fn not_found() -> HttpError {
    HttpError::not_found("Not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn context_carries_request_id_and_actor() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        headers.insert(ACTOR_HEADER, HeaderValue::from_static(" bridge-1 "));

        let ctx = request_context(&headers);
        assert_eq!(ctx.correlation_id(), Some("req-42"));
        assert_eq!(ctx.actor(), Some("bridge-1"));
    }

    #[test]
    fn blank_headers_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("  "));

        let ctx = request_context(&headers);
        assert_eq!(ctx.correlation_id(), None);
        assert_eq!(ctx.actor(), None);
    }
}
