use std::{sync::Arc, time::Duration};

use domain::User;

use crate::{
    clock::Clock,
    error::ApplicationError,
    session::{SessionId, SessionRecord, SessionStore},
};

pub struct SessionServiceDependencies {
    pub store: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
    pub ttl: Duration,
}

pub struct SessionService {
    deps: SessionServiceDependencies,
}

impl SessionService {
    pub fn new(deps: SessionServiceDependencies) -> Self {
        Self { deps }
    }

    /// 为登录成功的用户创建服务端会话
    pub async fn start(&self, user: &User) -> Result<SessionId, ApplicationError> {
        let id = SessionId::generate();
        let record = SessionRecord::for_user(user, self.deps.clock.now());
        self.deps.store.save(&id, &record, self.deps.ttl).await?;
        tracing::debug!(user_id = %user.id, "session started");
        Ok(id)
    }

    pub async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, ApplicationError> {
        Ok(self.deps.store.load(id).await?)
    }

    pub async fn end(&self, id: &SessionId) -> Result<(), ApplicationError> {
        self.deps.store.destroy(id).await?;
        tracing::debug!("session destroyed");
        Ok(())
    }
}
