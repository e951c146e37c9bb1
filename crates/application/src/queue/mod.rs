//! 发件箱与事件队列的存储抽象
//!
//! 服务只依赖这里的 trait，内存实现用于测试和单机运行，Redis 实现位于 infrastructure。

mod memory;

pub use memory::{InMemoryEventQueue, InMemoryMessageQueue};

use async_trait::async_trait;
use domain::{ChatMessage, DomainEvent, SessionId, UserId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),
    #[error("queue codec error: {0}")]
    Codec(String),
}

impl QueueError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }
}

/// 聊天发件箱
///
/// 每个会话一个独立的命名空间，以关联标识为键；会话只读写自己的命名空间，
/// 因此一条消息只会被发送它的会话取出。`fetch_all` 返回快照，顺序不作保证。
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// 同一关联标识再次保存时覆盖旧值
    async fn save(&self, session: &SessionId, message: &ChatMessage) -> Result<(), QueueError>;
    async fn fetch_all(&self, session: &SessionId) -> Result<Vec<ChatMessage>, QueueError>;
    /// 删除不存在的键视为成功
    async fn delete(&self, session: &SessionId, message: &ChatMessage) -> Result<(), QueueError>;
    /// 丢弃会话的整个命名空间，会话结束时调用
    async fn clear(&self, session: &SessionId) -> Result<(), QueueError>;
}

/// 按接收者划分的先进先出事件队列
#[async_trait]
pub trait EventQueue: Send + Sync {
    async fn push(&self, event: &DomainEvent) -> Result<(), QueueError>;
    async fn pop(&self, recipient: UserId) -> Result<Option<DomainEvent>, QueueError>;
    async fn count(&self, recipient: UserId) -> Result<u64, QueueError>;
}
