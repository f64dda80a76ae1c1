use crate::{
    command::{Command, CommandBus, CommandHandler},
    context::AppContext,
    error::AppError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{Instrument, info_span};

type BoxAnySend = Box<dyn Any + Send>;

/// 擦除了具体命令类型的处理器
#[async_trait]
trait ErasedCommandHandler: Send + Sync {
    async fn handle_any(&self, ctx: &AppContext, cmd: BoxAnySend) -> Result<BoxAnySend, AppError>;
}

struct Typed<C, H> {
    handler: Arc<H>,
    _command: PhantomData<fn() -> C>,
}

#[async_trait]
impl<C, H> ErasedCommandHandler for Typed<C, H>
where
    C: Command,
    H: CommandHandler<C> + 'static,
{
    async fn handle_any(&self, ctx: &AppContext, cmd: BoxAnySend) -> Result<BoxAnySend, AppError> {
        // 正常情况下这里的 downcast 永远不会失败（键与处理器同一泛型 C）
        let cmd = cmd.downcast::<C>().map_err(|_| AppError::TypeMismatch {
            expected: C::NAME,
            found: "unknown",
        })?;
        let out = self.handler.handle(ctx, *cmd).await?;
        Ok(Box::new(out) as BoxAnySend)
    }
}

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler
/// - 运行时以类型擦除（Any）方式进行调度，并在调用端还原回执类型
pub struct InMemoryCommandBus {
    handlers: DashMap<TypeId, (&'static str, Arc<dyn ErasedCommandHandler>)>,
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器；同一命令重复注册返回错误
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let key = TypeId::of::<C>();
        if self.handlers.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredCommand { command: C::NAME });
        }

        let erased: Arc<dyn ErasedCommandHandler> = Arc::new(Typed::<C, H> {
            handler,
            _command: PhantomData,
        });
        self.handlers.insert(key, (C::NAME, erased));

        Ok(())
    }

    /// 获取已注册的命令名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        let Some(handler) = self
            .handlers
            .get(&TypeId::of::<C>())
            .map(|h| h.value().1.clone())
        else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        let span = info_span!(
            "command",
            command = C::NAME,
            correlation_id = ctx.correlation_id().unwrap_or("-"),
        );
        let out = handler.handle_any(ctx, Box::new(cmd)).instrument(span).await?;

        match out.downcast::<C::Output>() {
            Ok(receipt) => Ok(*receipt),
            Err(_) => Err(AppError::TypeMismatch {
                expected: std::any::type_name::<C::Output>(),
                found: "unknown",
            }),
        }
    }
}
