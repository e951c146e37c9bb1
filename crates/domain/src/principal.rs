use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// 已认证的调用主体
///
/// 由认证步骤解析后显式传入通知会话，不经由任何隐式上下文传递。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
}

impl Principal {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
