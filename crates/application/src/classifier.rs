//! 错误分类器
//!
//! 把内部错误映射为（传输状态码，明细码，可公开的文本）。映射关系是一张表：
//! 新增错误种类只需要扩展表，不需要在调用点增加分支。

use std::collections::HashMap;

use crate::error::{ApplicationError, ErrorKind};
use crate::status::{Code, ErrorCode, ErrorDetail, Status};

/// 屏蔽后的通用文本
pub const MASKED_TEXT: &str = "internal error";

/// 对外公开的文本策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disclosure {
    /// 公开错误的真实文本
    Real,
    /// 用固定文本替换
    Fixed(&'static str),
    /// 用 [`MASKED_TEXT`] 替换，并把真实错误写入日志
    Masked,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub code: Code,
    pub detail: ErrorCode,
    pub disclosure: Disclosure,
}

impl Rule {
    pub const fn new(code: Code, detail: ErrorCode, disclosure: Disclosure) -> Self {
        Self {
            code,
            detail,
            disclosure,
        }
    }
}

const DEFAULT_RULES: &[(ErrorKind, Rule)] = &[
    (
        ErrorKind::Validation,
        Rule::new(Code::InvalidArgument, ErrorCode::Unknown, Disclosure::Real),
    ),
    (
        ErrorKind::Business,
        Rule::new(Code::Unknown, ErrorCode::Business, Disclosure::Real),
    ),
    (
        ErrorKind::NotFound,
        Rule::new(Code::NotFound, ErrorCode::EntityNotFound, Disclosure::Real),
    ),
    (
        ErrorKind::PermissionDenied,
        Rule::new(
            Code::PermissionDenied,
            ErrorCode::PermissionDenied,
            Disclosure::Real,
        ),
    ),
    (
        ErrorKind::Unauthenticated,
        Rule::new(
            Code::Unauthenticated,
            ErrorCode::PermissionDenied,
            Disclosure::Real,
        ),
    ),
    (
        ErrorKind::Cancelled,
        Rule::new(
            Code::Cancelled,
            ErrorCode::Internal,
            Disclosure::Fixed("request cancelled"),
        ),
    ),
    (
        ErrorKind::Transport,
        Rule::new(
            Code::Unavailable,
            ErrorCode::Internal,
            Disclosure::Fixed("stream unavailable"),
        ),
    ),
    (
        ErrorKind::Internal,
        Rule::new(Code::Internal, ErrorCode::Internal, Disclosure::Masked),
    ),
    (
        ErrorKind::Unknown,
        Rule::new(Code::Unknown, ErrorCode::Unknown, Disclosure::Masked),
    ),
];

const DEFAULT_FIELD_CODES: &[(&str, ErrorCode)] = &[
    ("text", ErrorCode::InvalidText),
    ("correlation_id", ErrorCode::InvalidCorrelationId),
];

/// 表驱动的错误分类器
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: HashMap<ErrorKind, Rule>,
    field_codes: HashMap<String, ErrorCode>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.iter().copied().collect(),
            field_codes: DEFAULT_FIELD_CODES
                .iter()
                .map(|(field, code)| (field.to_string(), *code))
                .collect(),
        }
    }
}

impl ErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 覆盖或新增一行分类规则
    pub fn with_rule(mut self, kind: ErrorKind, rule: Rule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    /// 为校验失败的字段指定明细码
    pub fn with_field_code(mut self, field: impl Into<String>, code: ErrorCode) -> Self {
        self.field_codes.insert(field.into(), code);
        self
    }

    pub fn classify(&self, error: &ApplicationError) -> Status {
        let kind = error.kind();
        let rule = self.rules.get(&kind).copied().unwrap_or(Rule::new(
            Code::Unknown,
            ErrorCode::Unknown,
            Disclosure::Masked,
        ));

        let (message, reason) = match rule.disclosure {
            Disclosure::Real => (error.to_string(), error.reason()),
            Disclosure::Fixed(text) => (text.to_string(), text.to_string()),
            Disclosure::Masked => {
                tracing::error!(error = %error, kind = ?kind, "内部错误已屏蔽");
                (MASKED_TEXT.to_string(), MASKED_TEXT.to_string())
            }
        };

        let details = match error {
            ApplicationError::Validation(violations) => violations
                .iter()
                .map(|violation| ErrorDetail::new(self.field_code(&violation.field), &violation.reason))
                .collect(),
            _ => vec![ErrorDetail::new(rule.detail, reason)],
        };

        Status::new(rule.code, message, details)
    }

    fn field_code(&self, field: &str) -> ErrorCode {
        self.field_codes
            .get(field)
            .copied()
            .unwrap_or(ErrorCode::Unknown)
    }
}
