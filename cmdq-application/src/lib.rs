//! 命令派发队列应用层（cmdq-application）
//!
//! 以 CQRS 方式组织队列用例：
//! - 写操作（`commands`）：入队、派发、完成上报、清空账本；
//! - 读操作（`queries`）：最近完成记录、队列计数；
//! - 进程内命令/查询总线按类型路由到 `QueueHandler`；
//! - `QueueApp` 负责装配，接口层只依赖总线与 DTO。
//!
pub mod app;
pub mod command;
pub mod commands;
pub mod context;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod queries;
pub mod query;
pub mod queue_handler;

pub use app::QueueApp;
pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
