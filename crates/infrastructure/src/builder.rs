use std::sync::Arc;

use application::{EventQueue, InMemoryEventQueue, InMemoryMessageQueue, MessageQueue};
use config::{StorageBackend, StorageConfig};
use thiserror::Error;

use crate::redis::{RedisEventQueue, RedisMessageQueue, RedisQueueError};

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("redis error: {0}")]
    Redis(#[from] RedisQueueError),
}

impl From<::redis::RedisError> for InfrastructureError {
    fn from(err: ::redis::RedisError) -> Self {
        Self::Redis(err.into())
    }
}

/// 按存储配置装配好的队列
#[derive(Clone)]
pub struct Infrastructure {
    pub message_queue: Arc<dyn MessageQueue>,
    pub event_queue: Arc<dyn EventQueue>,
}

impl Infrastructure {
    pub async fn connect(config: &StorageConfig) -> Result<Self, InfrastructureError> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!("使用内存队列");
                Ok(Self::in_memory())
            }
            StorageBackend::Redis => {
                let client = ::redis::Client::open(config.redis_url.as_str())?;

                // 两个队列共用一个自动重连的多路复用连接；启动时确认 Redis 可达
                let mut connection = client.get_connection_manager().await?;
                let _: String = ::redis::cmd("PING").query_async(&mut connection).await?;
                tracing::info!("使用 Redis 队列");

                Ok(Self {
                    message_queue: Arc::new(RedisMessageQueue::new(connection.clone())),
                    event_queue: Arc::new(RedisEventQueue::new(connection)),
                })
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            message_queue: Arc::new(InMemoryMessageQueue::new()),
            event_queue: Arc::new(InMemoryEventQueue::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_needs_no_server() {
        let infra = Infrastructure::connect(&StorageConfig::default())
            .await
            .unwrap();
        let session = domain::SessionId::from(uuid::Uuid::new_v4());
        assert!(infra.message_queue.fetch_all(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_redis_url_fails_fast() {
        let config = StorageConfig {
            backend: StorageBackend::Redis,
            redis_url: "not-a-url".to_string(),
        };
        assert!(Infrastructure::connect(&config).await.is_err());
    }
}
