//! 领域模型错误定义
//!
//! 定义了领域层与仓储层可能出现的错误类型，提供清晰的错误上下文。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 参数校验失败
    #[error("invalid argument: {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 邮箱已被注册
    #[error("user already exists")]
    UserAlreadyExists,

    /// 用户不存在
    #[error("user not found")]
    UserNotFound,

    /// 当前密码不正确
    #[error("current password is incorrect")]
    InvalidCurrentPassword,
}

impl DomainError {
    /// 创建参数校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 仓储层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record already exists")]
    Conflict,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
