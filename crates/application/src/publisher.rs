use std::sync::Arc;

use domain::{DomainEvent, EventType, NoteId, UserId};

use crate::clock::Clock;
use crate::ids::IdGenerator;
use crate::queue::EventQueue;

/// 写侧事件发布
///
/// 笔记写入提交后调用。发布是尽力而为的：推送失败只记录告警，
/// 不影响已经提交的写操作，也不重试。
pub struct NoteEventPublisher {
    event_queue: Arc<dyn EventQueue>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl NoteEventPublisher {
    pub fn new(
        event_queue: Arc<dyn EventQueue>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            event_queue,
            ids,
            clock,
        }
    }

    pub async fn note_created(&self, owner: UserId, note_id: NoteId) -> Option<DomainEvent> {
        self.publish(EventType::Created, owner, note_id).await
    }

    pub async fn note_deleted(&self, owner: UserId, note_id: NoteId) -> Option<DomainEvent> {
        self.publish(EventType::Deleted, owner, note_id).await
    }

    /// 推送成功时返回事件本身
    async fn publish(
        &self,
        event_type: EventType,
        owner: UserId,
        note_id: NoteId,
    ) -> Option<DomainEvent> {
        let event = DomainEvent::new(
            self.ids.event_id(),
            event_type,
            note_id,
            owner,
            self.clock.now(),
        );

        match self.event_queue.push(&event).await {
            Ok(()) => {
                tracing::debug!(user_id = %owner, note_id = %note_id, event_id = %event.id(), "领域事件已发布");
                Some(event)
            }
            Err(err) => {
                tracing::warn!(user_id = %owner, note_id = %note_id, error = %err, "领域事件发布失败，已丢弃");
                None
            }
        }
    }
}
