//! Redis 错误类型定义

use application::QueueError;
use thiserror::Error;

/// Redis 队列操作错误
#[derive(Error, Debug)]
pub enum RedisQueueError {
    /// 连接错误
    #[error("Redis 连接错误: {message}")]
    ConnectionError { message: String },

    /// 命令执行错误
    #[error("Redis 命令错误: {message}")]
    CommandError { message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError { message: String },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    SerializationError { message: String },
}

impl From<redis::RedisError> for RedisQueueError {
    fn from(err: redis::RedisError) -> Self {
        if err.kind() == redis::ErrorKind::InvalidClientConfig {
            return RedisQueueError::ConfigError {
                message: err.to_string(),
            };
        }
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            return RedisQueueError::ConnectionError {
                message: err.to_string(),
            };
        }
        RedisQueueError::CommandError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RedisQueueError {
    fn from(err: serde_json::Error) -> Self {
        RedisQueueError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<RedisQueueError> for QueueError {
    fn from(err: RedisQueueError) -> Self {
        match err {
            RedisQueueError::SerializationError { .. } => QueueError::codec(err.to_string()),
            other => QueueError::unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_errors_stay_distinguishable() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = QueueError::from(RedisQueueError::from(json_err));
        assert!(matches!(err, QueueError::Codec(_)));

        let err = QueueError::from(RedisQueueError::ConnectionError {
            message: "refused".into(),
        });
        assert!(matches!(err, QueueError::Unavailable(_)));
    }

    #[test]
    fn test_bad_url_is_config_error() {
        let err = redis::Client::open("not-a-url").unwrap_err();
        assert!(matches!(
            RedisQueueError::from(err),
            RedisQueueError::ConfigError { .. }
        ));
    }
}
