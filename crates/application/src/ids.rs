use domain::{CorrelationId, EventId, SessionId};
use uuid::Uuid;

/// 标识生成器
///
/// 作为能力对象注入到需要生成标识的服务中，不使用进程级单例。
pub trait IdGenerator: Send + Sync {
    fn correlation_id(&self) -> CorrelationId;
    fn event_id(&self) -> EventId;
    fn session_id(&self) -> SessionId;
}

/// 基于 UUID v4 的标识生成器
#[derive(Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn correlation_id(&self) -> CorrelationId {
        CorrelationId::from(Uuid::new_v4())
    }

    fn event_id(&self) -> EventId {
        EventId::from(Uuid::new_v4())
    }

    fn session_id(&self) -> SessionId {
        SessionId::from(Uuid::new_v4())
    }
}
