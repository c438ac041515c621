use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

/// 用户唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<UserId> for Uuid {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// 提现申请唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WithdrawalId(pub Uuid);

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for WithdrawalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<WithdrawalId> for Uuid {
    fn from(value: WithdrawalId) -> Self {
        value.0
    }
}

/// 经过验证的邮箱。
///
/// 保留用户输入的大小写，比较时忽略大小写。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("email", "cannot be empty"));
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::invalid_argument("email", "must contain '@'"));
        };
        if local.is_empty() || domain.is_empty() || value.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid_argument("email", "is malformed"));
        }
        if value.len() > 254 {
            return Err(DomainError::invalid_argument("email", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 小写形式，与数据库中 `LOWER(email)` 的比较口径一致
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }

    /// 忽略大小写（含非 ASCII 字符）比较两个邮箱
    pub fn matches(&self, other: &UserEmail) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 经过外部服务生成的密码哈希。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let hash = value.into();
        if hash.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "password_hash",
                "cannot be empty",
            ));
        }
        Ok(Self(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 提现金额，必须为有限正数。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(f64);

impl Amount {
    pub fn parse(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::invalid_argument("amount", "must be a number"));
        }
        if value <= 0.0 {
            return Err(DomainError::invalid_argument(
                "amount",
                "must be greater than zero",
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
