use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use domain::{ChatMessage, CorrelationId, DomainEvent, SessionId, UserId};

use super::{EventQueue, MessageQueue, QueueError};

fn poisoned<E>(_: E) -> QueueError {
    QueueError::unavailable("lock poisoned")
}

type Outbox = HashMap<CorrelationId, ChatMessage>;

/// 内存发件箱，按会话划分
#[derive(Debug, Default)]
pub struct InMemoryMessageQueue {
    sessions: RwLock<HashMap<SessionId, Outbox>>,
}

impl InMemoryMessageQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn save(&self, session: &SessionId, message: &ChatMessage) -> Result<(), QueueError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions
            .entry(session.clone())
            .or_default()
            .insert(message.correlation_id().clone(), message.clone());
        Ok(())
    }

    async fn fetch_all(&self, session: &SessionId) -> Result<Vec<ChatMessage>, QueueError> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions
            .get(session)
            .map(|outbox| outbox.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, session: &SessionId, message: &ChatMessage) -> Result<(), QueueError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        if let Some(outbox) = sessions.get_mut(session) {
            outbox.remove(message.correlation_id());
            if outbox.is_empty() {
                sessions.remove(session);
            }
        }
        Ok(())
    }

    async fn clear(&self, session: &SessionId) -> Result<(), QueueError> {
        self.sessions.write().map_err(poisoned)?.remove(session);
        Ok(())
    }
}

type Inbox = Arc<Mutex<VecDeque<DomainEvent>>>;

/// 内存事件队列
///
/// 每个接收者一把独立的锁，不同接收者之间的读写互不阻塞；
/// 外层表锁只在查找或创建收件箱时短暂持有。
#[derive(Debug, Default)]
pub struct InMemoryEventQueue {
    inboxes: RwLock<HashMap<UserId, Inbox>>,
}

impl InMemoryEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn inbox(&self, recipient: UserId) -> Result<Option<Inbox>, QueueError> {
        let inboxes = self.inboxes.read().map_err(poisoned)?;
        Ok(inboxes.get(&recipient).cloned())
    }

    fn inbox_or_create(&self, recipient: UserId) -> Result<Inbox, QueueError> {
        if let Some(inbox) = self.inbox(recipient)? {
            return Ok(inbox);
        }
        let mut inboxes = self.inboxes.write().map_err(poisoned)?;
        Ok(inboxes.entry(recipient).or_default().clone())
    }
}

#[async_trait]
impl EventQueue for InMemoryEventQueue {
    async fn push(&self, event: &DomainEvent) -> Result<(), QueueError> {
        let inbox = self.inbox_or_create(event.recipient())?;
        inbox.lock().map_err(poisoned)?.push_back(event.clone());
        Ok(())
    }

    async fn pop(&self, recipient: UserId) -> Result<Option<DomainEvent>, QueueError> {
        match self.inbox(recipient)? {
            Some(inbox) => Ok(inbox.lock().map_err(poisoned)?.pop_front()),
            None => Ok(None),
        }
    }

    async fn count(&self, recipient: UserId) -> Result<u64, QueueError> {
        match self.inbox(recipient)? {
            Some(inbox) => Ok(inbox.lock().map_err(poisoned)?.len() as u64),
            None => Ok(0),
        }
    }
}
