use chrono::{DateTime, Utc};
use domain::{DomainEvent, EventType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Created,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl From<EventType> for EventKind {
    fn from(value: EventType) -> Self {
        match value {
            EventType::Created => Self::Created,
            EventType::Deleted => Self::Deleted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    pub value: i64,
}

/// 通知会话的出站帧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationFrame {
    Unread {
        events: i32,
    },
    Event {
        id: String,
        #[serde(rename = "type")]
        kind: EventKind,
        note_id: NoteRef,
        event_time: DateTime<Utc>,
    },
}

impl NotificationFrame {
    /// 未读数超出 i32 时饱和
    pub fn unread(count: u64) -> Self {
        Self::Unread {
            events: i32::try_from(count).unwrap_or(i32::MAX),
        }
    }
}

impl From<&DomainEvent> for NotificationFrame {
    fn from(event: &DomainEvent) -> Self {
        Self::Event {
            id: event.id().to_string(),
            kind: event.event_type().into(),
            note_id: NoteRef {
                value: event.note_id().value(),
            },
            event_time: event.event_time(),
        }
    }
}
