use domain::{ChatMessage, CorrelationId, DomainError};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::IdGenerator;
use crate::status::Status;

/// 入站帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DispatchRequest {
    #[validate(nested)]
    pub message: MessagePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct HeaderPayload {
    #[serde(default)]
    #[validate(length(max = 64, message = "correlation id must be at most 64 characters"))]
    pub correlation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MessagePayload {
    #[serde(default)]
    #[validate(nested)]
    pub header: HeaderPayload,
    #[serde(default)]
    #[validate(length(
        min = 3,
        max = 1024,
        message = "text must be between 3 and 1024 characters"
    ))]
    pub text: String,
}

impl MessagePayload {
    pub fn new(correlation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            header: HeaderPayload {
                correlation_id: correlation_id.into(),
            },
            text: text.into(),
        }
    }

    /// 构造领域消息；缺省的关联标识由服务端生成
    pub fn into_message(self, ids: &dyn IdGenerator) -> Result<ChatMessage, DomainError> {
        let correlation_id = if self.header.correlation_id.is_empty() {
            ids.correlation_id()
        } else {
            CorrelationId::parse(self.header.correlation_id)?
        };
        ChatMessage::new(correlation_id, self.text)
    }
}

impl From<&ChatMessage> for MessagePayload {
    fn from(message: &ChatMessage) -> Self {
        Self::new(message.correlation_id().as_str(), message.text())
    }
}

impl DispatchRequest {
    pub fn new(correlation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            message: MessagePayload::new(correlation_id, text),
        }
    }
}

/// 出站帧：内联状态或已处理的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchResponse {
    Status(Status),
    Message(MessagePayload),
}
