//! 基础设施层实现。
//!
//! 提供发件箱与事件队列的 Redis 适配器，并按配置选择存储后端。

pub mod builder;
pub mod redis;

pub use builder::{Infrastructure, InfrastructureError};
pub use crate::redis::{RedisEventQueue, RedisMessageQueue, RedisQueueError, OUTBOX_PREFIX};
