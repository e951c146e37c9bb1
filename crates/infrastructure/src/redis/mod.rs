//! Redis 队列模块
//!
//! 提供发件箱与事件队列的 Redis 实现。

pub mod error;
pub mod event_queue;
pub mod message_queue;

// 重新导出
pub use error::*;
pub use event_queue::*;
pub use message_queue::*;
