//! Redis 会话存储
//!
//! 每个会话保存为一个带过期时间的 JSON 字符串，键为 `session:<id>`。

use std::time::Duration;

use application::{SessionId, SessionRecord, SessionStore, SessionStoreError};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

const SESSION_KEY_PREFIX: &str = "session:";

#[derive(Clone)]
pub struct RedisSessionStore {
    connection: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// 连接 Redis 并创建会话存储
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_connection_manager().await?;
        Ok(Self::new(connection))
    }
}

fn session_key(id: &SessionId) -> String {
    format!("{SESSION_KEY_PREFIX}{id}")
}

fn backend_err(err: redis::RedisError) -> SessionStoreError {
    SessionStoreError::backend(err.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let payload = serde_json::to_string(record)
            .map_err(|err| SessionStoreError::Serialization(err.to_string()))?;
        // Redis 不接受 0 秒过期
        let ttl_seconds = ttl.as_secs().max(1);

        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(session_key(id))
            .arg(payload)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(backend_err)?;

        debug!(ttl_seconds, "session stored");
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
        let mut conn = self.connection.clone();
        let payload: Option<String> = redis::cmd("GET")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await
            .map_err(backend_err)?;

        payload
            .map(|raw| {
                serde_json::from_str(&raw)
                    .map_err(|err| SessionStoreError::Serialization(err.to_string()))
            })
            .transpose()
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("DEL")
            .arg(session_key(id))
            .query_async(&mut conn)
            .await
            .map_err(backend_err)?;

        debug!("session destroyed");
        Ok(())
    }
}
