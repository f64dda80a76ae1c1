//! 服务入口：加载配置、初始化日志、按需启动超时回收，并监听 HTTP。

use anyhow::Context;
use clap::Parser;
use cmdq_application::QueueApp;
use cmdq_domain::Scheduler;
use cmdq_domain::reclaim::ReclaimEngine;
use cmdq_server::{AppState, config::ServerConfig, routes::VERSION};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = dotenvy::dotenv().is_ok();
    let config = ServerConfig::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded environment from .env");
    }

    let scheduler = Arc::new(Scheduler::new(config.scheduler_config()));
    let app = QueueApp::new(scheduler.clone()).context("failed to register queue handlers")?;

    let reclaim = match config.reclaim_config() {
        Some(reclaim_config) => {
            let engine = ReclaimEngine::builder()
                .scheduler(scheduler.clone())
                .config(reclaim_config)
                .build();
            Some(Arc::new(engine).start())
        }
        None => {
            warn!("visibility timeout disabled; unreported commands stay in processing");
            None
        }
    };

    let router = cmdq_server::router(AppState::new(Arc::new(app)));

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        addr = %addr,
        version = VERSION,
        ledger_capacity = config.ledger_capacity,
        "cmdq server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server terminated")?;

    if let Some(handle) = reclaim {
        handle.shutdown();
        handle.join().await;
    }

    info!("cmdq server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
