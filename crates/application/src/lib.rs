//! 应用层实现。
//!
//! 这里提供围绕领域模型的流式会话服务：聊天分发、事件推送、写侧事件发布，
//! 以及对外部适配器（发件箱、事件队列、标识生成、时钟）的抽象。

pub mod chat;
pub mod classifier;
pub mod clock;
pub mod error;
pub mod ids;
pub mod notify;
pub mod publisher;
pub mod queue;
pub mod status;
pub mod stream;

pub use chat::{
    BusinessFailureSimulation, ChatDispatcher, ChatDispatcherDependencies, ChatSettings,
    DispatchRequest, DispatchResponse, MessagePayload,
};
pub use classifier::{Disclosure, ErrorClassifier, Rule};
pub use clock::{Clock, SystemClock};
pub use error::{ApplicationError, ErrorKind, FieldViolation};
pub use ids::{IdGenerator, UuidGenerator};
pub use notify::{EventNotifier, NotificationFrame, NotifierSettings};
pub use publisher::NoteEventPublisher;
pub use queue::{EventQueue, InMemoryEventQueue, InMemoryMessageQueue, MessageQueue, QueueError};
pub use status::{Code, ErrorCode, ErrorDetail, Status};
