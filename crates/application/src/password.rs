//! 密码哈希端口与密码长度规则

use async_trait::async_trait;
use domain::{DomainError, PasswordHash};
use thiserror::Error;

/// 注册与修改密码时要求的最少字符数
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// 按字符数（而非字节数）检查密码长度，`field` 用于错误提示
pub fn ensure_password_length(field: &str, password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::invalid_argument(
            field,
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("failed to verify password: {0}")]
    Verify(String),
    /// 阻塞线程池中的哈希任务未能完成
    #[error("password worker failed: {0}")]
    Worker(String),
}

impl PasswordHasherError {
    pub fn hash_error(message: impl Into<String>) -> Self {
        Self::Hash(message.into())
    }

    pub fn verify_error(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }

    pub fn worker_error(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }
}

/// 密码哈希适配器。`verify` 对不匹配返回 `Ok(false)`，
/// 只有哈希本身损坏或计算失败时才返回错误。
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError>;
    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters() {
        assert!(ensure_password_length("password", "abcde").is_err());
        assert!(ensure_password_length("password", "abcdef").is_ok());
        // 多字节字符按一个字符计
        assert!(ensure_password_length("password", "密码密码密码").is_ok());
    }

    #[test]
    fn error_names_the_field() {
        let err = ensure_password_length("newPassword", "123").unwrap_err();
        assert!(err.to_string().contains("newPassword"));
    }
}
