//! 笔记系统流式分发与通知的核心领域模型
//!
//! 包含聊天消息、领域事件、调用主体等实体，以及相关的值对象和错误定义。

pub mod errors;
pub mod event;
pub mod message;
pub mod principal;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use event::*;
pub use message::*;
pub use principal::*;
pub use value_objects::*;
