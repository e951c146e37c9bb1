use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::CorrelationId;

/// 处理完成的消息文本前缀
pub const PROCESSED_PREFIX: &str = "processed: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub correlation_id: CorrelationId,
}

/// 聊天消息
///
/// 文本在构造时校验，永远不会为空；存入发件箱后以 `correlation_id` 为键。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    header: MessageHeader,
    text: String,
}

impl ChatMessage {
    pub fn new(correlation_id: CorrelationId, text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::EmptyText);
        }

        Ok(Self {
            header: MessageHeader { correlation_id },
            text,
        })
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        &self.header.correlation_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 生成"已处理"副本，保留原关联标识
    pub fn processed(&self) -> Self {
        Self {
            header: self.header.clone(),
            text: format!("{}{}", PROCESSED_PREFIX, self.text),
        }
    }
}
