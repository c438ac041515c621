//! 服务端会话抽象
//!
//! 会话记录保存在外部存储中（生产环境为 Redis），按会话 ID 索引，
//! 超过固定 TTL 后由存储自动过期。

use std::{fmt, time::Duration};

use async_trait::async_trait;
use data_encoding::BASE64URL_NOPAD;
use domain::{Timestamp, User, UserRole};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const SESSION_ID_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session backend error: {0}")]
    Backend(String),
    #[error("session payload error: {0}")]
    Serialization(String),
}

impl SessionStoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// 随机生成的会话 ID（base64url，无填充）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(BASE64URL_NOPAD.encode(&bytes))
    }

    /// 解析客户端提交的会话 ID，格式不符时返回 None
    pub fn parse(value: &str) -> Option<Self> {
        let decoded = BASE64URL_NOPAD.decode(value.as_bytes()).ok()?;
        (decoded.len() == SESSION_ID_BYTES).then(|| Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub created_at: Timestamp,
}

impl SessionRecord {
    pub fn for_user(user: &User, now: Timestamp) -> Self {
        Self {
            user_id: Uuid::from(user.id),
            email: user.email.as_str().to_owned(),
            role: user.role,
            created_at: now,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError>;
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_parse_back() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), 43);
        assert_eq!(SessionId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!(SessionId::parse("").is_none());
        assert!(SessionId::parse("not a session").is_none());
        assert!(SessionId::parse("c2hvcnQ").is_none());
    }
}
