use serde::{Deserialize, Serialize};

use crate::value_objects::{Amount, Timestamp, UserEmail, UserId, WithdrawalId};

/// 提现申请，仅记录创建，不建模后续审批流程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user_id: UserId,
    /// 申请时的邮箱快照，供管理端列表展示
    pub requester_email: UserEmail,
    pub amount: Amount,
    pub created_at: Timestamp,
}

impl Withdrawal {
    pub fn request(
        id: WithdrawalId,
        user_id: UserId,
        requester_email: UserEmail,
        amount: Amount,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            requester_email,
            amount,
            created_at: now,
        }
    }
}
