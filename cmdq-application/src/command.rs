//! 写侧契约：命令、处理器与命令总线
//!
//! 每个会改变队列状态的用例都是一个 [`Command`]，由唯一的 [`CommandHandler`] 处理，
//! 接口层只通过 [`CommandBus`] 分发，不直接持有处理器。
//!
use async_trait::async_trait;

use crate::{context::AppContext, dto::Dto, error::AppError};

/// 会修改队列状态的请求，如入队、派发、完成上报
pub trait Command: Send + Sync + 'static {
    /// 稳定名称，写入追踪 span 与注册表
    const NAME: &'static str;

    /// 执行回执
    type Output: Dto;
}

#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError>;
}

/// 按命令类型路由到已注册的处理器；未注册时返回 [`AppError::HandlerNotFound`]
#[async_trait]
pub trait CommandBus: Send + Sync {
    async fn dispatch<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError>;
}
