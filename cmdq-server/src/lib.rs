//! 命令派发队列的 HTTP 接口（cmdq-server）
//!
//! - 生产者通过 `POST /api/queue` 提交命令；
//! - 执行端轮询 `GET /api/queue/next`，完成后调用 `POST /api/queue/{id}/complete` 上报；
//! - 最近完成记录、计数与健康检查均为只读接口。
//!
//! 跨域完全开放，所有请求经 `tower_http` 追踪。
//!
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
