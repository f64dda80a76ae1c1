//! 超时回收引擎（ReclaimEngine）
//!
//! 处理中集合没有内建的超时：已派发但执行端从未上报的命令会一直留在其中。
//! 本引擎是可选扩展，按固定间隔调用 [`Scheduler::reclaim_expired`]，
//! 将超过可见性超时的命令以失败结束并写入账本（不会重新投递）。
//!
//! 提供关闭与等待的 `EngineHandle`，句柄被丢弃时自动取消后台任务。
//!
use bon::Builder;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::scheduler::Scheduler;

/// 回收引擎配置
#[derive(Clone, Copy, Debug)]
pub struct ReclaimConfig {
    /// 两次回收扫描之间的间隔
    pub interval: Duration,
    /// 处理中命令允许的最长未上报时间
    pub visibility_timeout: Duration,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            visibility_timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Builder)]
pub struct ReclaimEngine {
    scheduler: Arc<Scheduler>,
    #[builder(default)]
    config: ReclaimConfig,
}

impl ReclaimEngine {
    /// 启动回收任务，返回可用于关闭/等待的句柄
    pub fn start(self: Arc<Self>) -> EngineHandle {
        let token = CancellationToken::new();
        let mut tasks: Vec<JoinHandle<()>> = Vec::with_capacity(1);

        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            visibility_timeout_secs = self.config.visibility_timeout.as_secs(),
            "reclaim engine started"
        );

        {
            let scheduler = self.scheduler.clone();
            let timeout = self.config.visibility_timeout;

            tasks.push(Self::spawn_periodic(
                token.clone(),
                self.config.interval,
                move || {
                    let scheduler = scheduler.clone();
                    async move {
                        match scheduler.reclaim_expired(timeout, Utc::now()) {
                            Ok(ids) if !ids.is_empty() => {
                                info!(count = ids.len(), "expired processing commands reclaimed");
                            }
                            Ok(_) => {}
                            Err(err) => error!(error = %err, "reclaim pass failed"),
                        }
                    }
                },
            ));
        }

        EngineHandle { token, tasks }
    }

    fn spawn_periodic<F, Fut>(
        token: CancellationToken,
        interval: Duration,
        mut f: F,
    ) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => f().await,
                }
            }
        })
    }
}

/// 引擎运行句柄：用于优雅关闭与等待任务结束
pub struct EngineHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub async fn join(mut self) {
        let tasks = std::mem::take(&mut self.tasks);

        for t in tasks {
            let _ = t.await;
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandStatus, NewCommand};

    #[tokio::test(flavor = "multi_thread")]
    async fn engine_expires_unreported_commands() {
        let scheduler = Arc::new(Scheduler::default());
        scheduler
            .enqueue(NewCommand::builder().name("never-reported").build())
            .unwrap();
        scheduler.dispatch_next().unwrap();

        let engine = Arc::new(
            ReclaimEngine::builder()
                .scheduler(scheduler.clone())
                .config(ReclaimConfig {
                    interval: Duration::from_millis(20),
                    visibility_timeout: Duration::from_millis(50),
                })
                .build(),
        );
        let handle = engine.start();

        // 使用 timeout + 条件轮询，减少固定 sleep 的脆弱性
        let _ = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if scheduler.stats().unwrap().completed == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        handle.shutdown();
        handle.join().await;

        let stats = scheduler.stats().unwrap();
        assert_eq!(stats.processing, 0);
        assert_eq!(stats.completed, 1);
        let recent = scheduler.recent_completions(None).unwrap();
        assert_eq!(recent[0].status(), CommandStatus::Failed);
    }

    #[tokio::test]
    async fn dropping_handle_stops_engine() {
        let engine = Arc::new(
            ReclaimEngine::builder()
                .scheduler(Arc::new(Scheduler::default()))
                .build(),
        );
        let handle = engine.start();
        let token = handle.token.clone();
        drop(handle);
        assert!(token.is_cancelled());
    }
}
