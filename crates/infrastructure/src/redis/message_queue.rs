//! Redis 发件箱
//!
//! 每个会话一个哈希 `chat:outbox:{session}`：字段为关联标识，值为消息的 JSON。

use application::{MessageQueue, QueueError};
use async_trait::async_trait;
use domain::{ChatMessage, SessionId};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::error::RedisQueueError;

pub const OUTBOX_PREFIX: &str = "chat:outbox";

pub struct RedisMessageQueue {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisMessageQueue {
    pub fn new(connection: ConnectionManager) -> Self {
        Self::with_prefix(connection, OUTBOX_PREFIX)
    }

    /// 使用自定义键前缀，便于测试隔离
    pub fn with_prefix(connection: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            connection,
            prefix: prefix.into(),
        }
    }

    fn outbox_key(&self, session: &SessionId) -> String {
        outbox_key(&self.prefix, session)
    }
}

fn outbox_key(prefix: &str, session: &SessionId) -> String {
    format!("{}:{}", prefix, session)
}

#[async_trait]
impl MessageQueue for RedisMessageQueue {
    async fn save(&self, session: &SessionId, message: &ChatMessage) -> Result<(), QueueError> {
        let payload = serde_json::to_string(message).map_err(RedisQueueError::from)?;
        let mut conn = self.connection.clone();

        let _: () = conn
            .hset(
                self.outbox_key(session),
                message.correlation_id().as_str(),
                payload,
            )
            .await
            .map_err(RedisQueueError::from)?;
        Ok(())
    }

    async fn fetch_all(&self, session: &SessionId) -> Result<Vec<ChatMessage>, QueueError> {
        let key = self.outbox_key(session);
        let mut conn = self.connection.clone();
        let values: Vec<String> = conn.hvals(&key).await.map_err(RedisQueueError::from)?;

        // 单条损坏不影响其余消息的投递
        let messages = values
            .iter()
            .filter_map(|raw| match serde_json::from_str::<ChatMessage>(raw) {
                Ok(message) => Some(message),
                Err(err) => {
                    tracing::warn!(error = %err, key = %key, "跳过无法解析的发件箱条目");
                    None
                }
            })
            .collect();
        Ok(messages)
    }

    async fn delete(&self, session: &SessionId, message: &ChatMessage) -> Result<(), QueueError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .hdel(self.outbox_key(session), message.correlation_id().as_str())
            .await
            .map_err(RedisQueueError::from)?;
        Ok(())
    }

    async fn clear(&self, session: &SessionId) -> Result<(), QueueError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(self.outbox_key(session))
            .await
            .map_err(RedisQueueError::from)?;
        Ok(())
    }
}
