use serde::{Deserialize, Serialize};

use crate::value_objects::{EventId, NoteId, Timestamp, UserId};

/// 领域事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Created,
    Deleted,
}

/// 笔记领域事件
///
/// 创建后不可变；只追加到笔记所有者的事件队列中，按先进先出被取出一次。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    id: EventId,
    event_type: EventType,
    note_id: NoteId,
    recipient: UserId,
    event_time: Timestamp,
}

impl DomainEvent {
    pub fn new(
        id: EventId,
        event_type: EventType,
        note_id: NoteId,
        recipient: UserId,
        event_time: Timestamp,
    ) -> Self {
        Self {
            id,
            event_type,
            note_id,
            recipient,
            event_time,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    /// 事件接收者，即笔记所有者
    pub fn recipient(&self) -> UserId {
        self.recipient
    }

    pub fn event_time(&self) -> Timestamp {
        self.event_time
    }
}
