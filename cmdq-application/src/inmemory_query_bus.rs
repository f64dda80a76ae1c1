use crate::{
    context::AppContext,
    error::AppError,
    query::{Query, QueryBus, QueryHandler},
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{Instrument, debug_span};

type BoxAnySend = Box<dyn Any + Send>;

#[async_trait]
trait ErasedQueryHandler: Send + Sync {
    async fn handle_any(&self, ctx: &AppContext, q: BoxAnySend) -> Result<BoxAnySend, AppError>;
}

struct Typed<Q, H> {
    handler: Arc<H>,
    _query: PhantomData<fn() -> Q>,
}

#[async_trait]
impl<Q, H> ErasedQueryHandler for Typed<Q, H>
where
    Q: Query,
    H: QueryHandler<Q> + 'static,
{
    async fn handle_any(&self, ctx: &AppContext, q: BoxAnySend) -> Result<BoxAnySend, AppError> {
        let q = q.downcast::<Q>().map_err(|_| AppError::TypeMismatch {
            expected: type_name::<Q>(),
            found: "unknown",
        })?;
        let dto = self.handler.handle(ctx, *q).await?;
        Ok(Box::new(dto) as BoxAnySend)
    }
}

/// 基于内存的 QueryBus 实现
/// - 通过 TypeId 注册不同 Query 对应的 Handler
/// - 以类型擦除方式调度，并在调用端进行结果还原
pub struct InMemoryQueryBus {
    handlers: DashMap<TypeId, (&'static str, Arc<dyn ErasedQueryHandler>)>,
}

impl Default for InMemoryQueryBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryQueryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册查询处理器
    pub fn register<Q, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let key = TypeId::of::<Q>();

        if self.handlers.contains_key(&key) {
            return Err(AppError::AlreadyRegisteredQuery { query: Q::NAME });
        }

        let erased: Arc<dyn ErasedQueryHandler> = Arc::new(Typed::<Q, H> {
            handler,
            _query: PhantomData,
        });
        self.handlers.insert(key, (Q::NAME, erased));

        Ok(())
    }

    /// 获取已注册的查询类型名列表（只读视图）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[async_trait]
impl QueryBus for InMemoryQueryBus {
    async fn dispatch<Q: Query>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, AppError> {
        let Some(f) = self
            .handlers
            .get(&TypeId::of::<Q>())
            .map(|h| h.value().1.clone())
        else {
            return Err(AppError::HandlerNotFound(Q::NAME));
        };

        let span = debug_span!(
            "query",
            query = Q::NAME,
            correlation_id = ctx.correlation_id().unwrap_or("-"),
        );
        let out = f.handle_any(ctx, Box::new(q)).instrument(span).await?;

        match out.downcast::<Q::Dto>() {
            Ok(dto) => Ok(*dto),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<Q::Dto>(),
                found: "unknown",
            }),
        }
    }
}
