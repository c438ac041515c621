use std::sync::Arc;

use domain::{
    Amount, DomainError, UserId, UserRepository, Withdrawal, WithdrawalId, WithdrawalRepository,
};
use uuid::Uuid;

use crate::{clock::Clock, error::ApplicationError};

/// 未指定 `limit` 时管理端列表返回的条数
pub const DEFAULT_WITHDRAWAL_PAGE: u32 = 100;

#[derive(Debug, Clone)]
pub struct SubmitWithdrawalRequest {
    pub user_id: Uuid,
    pub amount: f64,
}

pub struct WithdrawalServiceDependencies {
    pub withdrawal_repository: Arc<dyn WithdrawalRepository>,
    pub user_repository: Arc<dyn UserRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct WithdrawalService {
    deps: WithdrawalServiceDependencies,
}

impl WithdrawalService {
    pub fn new(deps: WithdrawalServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn submit(
        &self,
        request: SubmitWithdrawalRequest,
    ) -> Result<Withdrawal, ApplicationError> {
        let amount = Amount::parse(request.amount)?;
        let user = self
            .deps
            .user_repository
            .find_by_id(UserId::from(request.user_id))
            .await?
            .ok_or(ApplicationError::Domain(DomainError::UserNotFound))?;

        let withdrawal = Withdrawal::request(
            WithdrawalId::from(Uuid::new_v4()),
            user.id,
            user.email.clone(),
            amount,
            self.deps.clock.now(),
        );
        let stored = self.deps.withdrawal_repository.create(withdrawal).await?;

        tracing::info!(
            withdrawal_id = %stored.id,
            user_id = %stored.user_id,
            amount = stored.amount.value(),
            "withdrawal requested"
        );
        Ok(stored)
    }

    /// 最近的提现申请，按时间倒序，最多 `limit` 条
    pub async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<Withdrawal>, ApplicationError> {
        let limit = limit.unwrap_or(DEFAULT_WITHDRAWAL_PAGE);
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.deps.withdrawal_repository.list_recent(limit).await?)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Withdrawal>, ApplicationError> {
        Ok(self
            .deps
            .withdrawal_repository
            .list_by_user(UserId::from(user_id))
            .await?)
    }
}
