use bon::Builder;

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，例如：
/// - 关联 ID（`correlation_id`）：贯穿一次请求的追踪标识，通常来自 `x-request-id`；
/// - 调用方（`actor`）：生产者或执行端的自描述标签，仅用于日志与审计。
///
/// 典型用法：
/// ```rust
/// use cmdq_application::context::AppContext;
///
/// let ctx = AppContext::builder()
///     .correlation_id("req-123")
///     .actor("bridge-1")
///     .build();
/// assert_eq!(ctx.correlation_id(), Some("req-123"));
/// ```
#[derive(Builder, Clone, Debug, Default)]
pub struct AppContext {
    #[builder(into)]
    correlation_id: Option<String>,
    #[builder(into)]
    actor: Option<String>,
}

impl AppContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }
}
