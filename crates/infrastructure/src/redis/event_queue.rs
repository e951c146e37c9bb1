//! Redis 事件队列
//!
//! 每个接收者一个列表：RPUSH 追加，LPOP 取最旧，LLEN 计数。单键命令在 Redis 端原子执行。

use application::{EventQueue, QueueError};
use async_trait::async_trait;
use domain::{DomainEvent, UserId};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::error::RedisQueueError;

pub struct RedisEventQueue {
    connection: ConnectionManager,
    namespace: String,
}

impl RedisEventQueue {
    pub fn new(connection: ConnectionManager) -> Self {
        Self::with_namespace(connection, "user")
    }

    pub fn with_namespace(connection: ConnectionManager, namespace: impl Into<String>) -> Self {
        Self {
            connection,
            namespace: namespace.into(),
        }
    }

    fn events_key(&self, user_id: UserId) -> String {
        events_key(&self.namespace, user_id)
    }
}

/// 生成用户事件列表的Redis键
fn events_key(namespace: &str, user_id: UserId) -> String {
    format!("{}:{}:events", namespace, user_id)
}

#[async_trait]
impl EventQueue for RedisEventQueue {
    async fn push(&self, event: &DomainEvent) -> Result<(), QueueError> {
        let payload = serde_json::to_string(event).map_err(RedisQueueError::from)?;
        let mut conn = self.connection.clone();

        let _: () = conn
            .rpush(self.events_key(event.recipient()), payload)
            .await
            .map_err(RedisQueueError::from)?;
        Ok(())
    }

    async fn pop(&self, recipient: UserId) -> Result<Option<DomainEvent>, QueueError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn
            .lpop(self.events_key(recipient), None)
            .await
            .map_err(RedisQueueError::from)?;

        match raw {
            Some(raw) => {
                let event = serde_json::from_str(&raw).map_err(RedisQueueError::from)?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    async fn count(&self, recipient: UserId) -> Result<u64, QueueError> {
        let mut conn = self.connection.clone();
        let len: u64 = conn
            .llen(self.events_key(recipient))
            .await
            .map_err(RedisQueueError::from)?;
        Ok(len)
    }
}
