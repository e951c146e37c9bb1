//! 对外可见的结构化状态
//!
//! 状态码沿用 gRPC 编号，明细码是稳定、可测试的枚举。
//! [`Status`] 与 [`ErrorDetail`] 只能由 [`crate::ErrorClassifier`] 生成。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 传输层状态码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Code {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    NotFound,
    PermissionDenied,
    Internal,
    Unavailable,
    Unauthenticated,
}

impl From<Code> for i32 {
    fn from(value: Code) -> Self {
        match value {
            Code::Ok => 0,
            Code::Cancelled => 1,
            Code::Unknown => 2,
            Code::InvalidArgument => 3,
            Code::NotFound => 5,
            Code::PermissionDenied => 7,
            Code::Internal => 13,
            Code::Unavailable => 14,
            Code::Unauthenticated => 16,
        }
    }
}

#[derive(Debug, Error)]
#[error("unsupported status code: {0}")]
pub struct UnsupportedCode(i32);

impl TryFrom<i32> for Code {
    type Error = UnsupportedCode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Code::Ok),
            1 => Ok(Code::Cancelled),
            2 => Ok(Code::Unknown),
            3 => Ok(Code::InvalidArgument),
            5 => Ok(Code::NotFound),
            7 => Ok(Code::PermissionDenied),
            13 => Ok(Code::Internal),
            14 => Ok(Code::Unavailable),
            16 => Ok(Code::Unauthenticated),
            other => Err(UnsupportedCode(other)),
        }
    }
}

/// 明细原因码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unknown,
    Internal,
    InvalidText,
    InvalidCorrelationId,
    Business,
    EntityNotFound,
    PermissionDenied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    code: ErrorCode,
    reason: String,
}

impl ErrorDetail {
    pub(crate) fn new(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// 结构化状态，既可作为内联状态帧，也可作为会话的终止错误
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code:?}: {message}")]
pub struct Status {
    code: Code,
    message: String,
    details: Vec<ErrorDetail>,
}

impl Status {
    pub(crate) fn new(code: Code, message: impl Into<String>, details: Vec<ErrorDetail>) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[ErrorDetail] {
        &self.details
    }
}
