use cmdq_application::QueueApp;
use std::sync::Arc;
use std::time::Instant;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    app: Arc<QueueApp>,
    started_at: Instant,
}

impl AppState {
    pub fn new(app: Arc<QueueApp>) -> Self {
        Self {
            app,
            started_at: Instant::now(),
        }
    }

    pub fn app(&self) -> &QueueApp {
        &self.app
    }

    /// 进程启动以来的秒数
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
