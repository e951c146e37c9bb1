//! 领域模型错误定义
//!
//! 定义了领域层所有可能的错误类型，提供清晰的错误上下文。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 消息文本为空（或只包含空白字符）
    #[error("empty text")]
    EmptyText,

    /// 笔记不存在
    #[error("note not found")]
    NoteNotFound,

    /// 用户不存在
    #[error("user not found")]
    UserNotFound,

    /// 权限不足
    #[error("permission denied")]
    PermissionDenied,

    /// 参数错误
    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    /// 创建参数错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
