use std::borrow::Cow;
use std::fmt;

use domain::DomainError;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::queue::QueueError;

/// 错误分类键，对应 [`crate::ErrorClassifier`] 表中的一行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Business,
    NotFound,
    PermissionDenied,
    Unauthenticated,
    Cancelled,
    Transport,
    Internal,
    Unknown,
}

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{}", join_violations(.0))]
    Validation(Vec<FieldViolation>),
    #[error("{message}")]
    Business { message: String, reason: String },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ApplicationError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, reason)])
    }

    pub fn business(message: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Business {
            message: message.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Business { .. } => ErrorKind::Business,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Transport(_) => ErrorKind::Transport,
            // 存储不可用说明服务本身出了问题，而不是输入有误
            Self::Queue(_) | Self::Internal(_) => ErrorKind::Internal,
            Self::Unexpected(_) => ErrorKind::Unknown,
        }
    }

    /// 明细记录中使用的原因文本
    pub fn reason(&self) -> String {
        match self {
            Self::Business { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }

    /// 会话内可恢复的错误：以内联状态帧报告，流保持打开
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::Business)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<DomainError> for ApplicationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::EmptyText => Self::validation("text", value.to_string()),
            DomainError::InvalidArgument { field, reason } => Self::validation(field, reason),
            DomainError::NoteNotFound | DomainError::UserNotFound => {
                Self::NotFound(value.to_string())
            }
            DomainError::PermissionDenied => Self::PermissionDenied(value.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApplicationError {
    fn from(value: ValidationErrors) -> Self {
        let mut violations = Vec::new();
        collect_violations(&value, &mut violations);
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Self::Validation(violations)
    }
}

/// 展开嵌套结构的校验结果，只保留叶子字段名
fn collect_violations(errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(items) => {
                for item in items {
                    let reason = item
                        .message
                        .clone()
                        .unwrap_or_else(|| Cow::Owned(format!("invalid {}", item.code)));
                    out.push(FieldViolation::new(field.to_string(), reason));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_violations(nested, out),
            ValidationErrorsKind::List(entries) => {
                for nested in entries.values() {
                    collect_violations(nested, out);
                }
            }
        }
    }
}
