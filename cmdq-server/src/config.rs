use clap::Parser;
use cmdq_domain::SchedulerConfig;
use cmdq_domain::ledger::DEFAULT_LEDGER_CAPACITY;
use cmdq_domain::reclaim::ReclaimConfig;
use std::time::Duration;

/// 可见性超时上限（30 天）
pub const MAX_VISIBILITY_TIMEOUT_SECS: u64 = 30 * 24 * 60 * 60;

/// 服务端配置：命令行参数优先，未给出时读取对应环境变量
#[derive(Parser, Debug, Clone)]
#[command(name = "cmdq-server")]
#[command(about = "进程内命令派发队列（供执行端轮询）")]
pub struct ServerConfig {
    /// 监听地址
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// 监听端口
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// 完成账本容量，超出后丢弃最早的记录
    #[arg(long, env = "CMDQ_LEDGER_CAPACITY", default_value_t = DEFAULT_LEDGER_CAPACITY)]
    pub ledger_capacity: usize,

    /// 处理中命令超过该秒数未上报即以失败结束；未设置或为 0 时不回收
    #[arg(
        long,
        env = "CMDQ_VISIBILITY_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(0..=MAX_VISIBILITY_TIMEOUT_SECS)
    )]
    pub visibility_timeout_secs: Option<u64>,

    /// 两次超时扫描之间的秒数
    #[arg(long, env = "CMDQ_RECLAIM_INTERVAL_SECS", default_value_t = 5)]
    pub reclaim_interval_secs: u64,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::builder()
            .ledger_capacity(self.ledger_capacity)
            .build()
    }

    /// 仅在配置了非零可见性超时时返回回收配置
    pub fn reclaim_config(&self) -> Option<ReclaimConfig> {
        let timeout = self
            .visibility_timeout_secs
            .filter(|secs| *secs > 0)?
            .min(MAX_VISIBILITY_TIMEOUT_SECS);
        Some(ReclaimConfig {
            interval: Duration::from_secs(self.reclaim_interval_secs.max(1)),
            visibility_timeout: Duration::from_secs(timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let argv = std::iter::once("cmdq-server").chain(args.iter().copied());
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn explicit_flags_win() {
        let cfg = parse(&[
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--ledger-capacity",
            "10",
        ]);
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.scheduler_config().ledger_capacity, 10);
    }

    #[test]
    fn reclaim_requires_positive_timeout() {
        let cfg = parse(&["--visibility-timeout-secs", "0"]);
        assert!(cfg.reclaim_config().is_none());

        let cfg = parse(&[
            "--visibility-timeout-secs",
            "30",
            "--reclaim-interval-secs",
            "0",
        ]);
        let rc = cfg.reclaim_config().unwrap();
        assert_eq!(rc.visibility_timeout, Duration::from_secs(30));
        assert_eq!(rc.interval, Duration::from_secs(1));
    }

    #[test]
    fn oversized_visibility_timeout_is_refused() {
        let argv = ["cmdq-server", "--visibility-timeout-secs", "10000000000000"];
        assert!(ServerConfig::try_parse_from(argv).is_err());

        let max = MAX_VISIBILITY_TIMEOUT_SECS.to_string();
        let cfg = parse(&["--visibility-timeout-secs", &max]);
        assert_eq!(
            cfg.reclaim_config().unwrap().visibility_timeout,
            Duration::from_secs(MAX_VISIBILITY_TIMEOUT_SECS)
        );
    }
}
