use domain::{Timestamp, User, UserRole, UserStatus, Withdrawal};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 对外暴露的用户信息，字段名与前端约定一致（camelCase）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub referred_by: Option<String>,
    pub referrals: i32,
    pub earnings: f64,
    pub rank_progress: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: Uuid::from(user.id),
            email: user.email.as_str().to_owned(),
            role: user.role,
            status: user.status,
            first_name: user.profile.first_name.clone(),
            last_name: user.profile.last_name.clone(),
            phone: user.profile.phone.clone(),
            referred_by: user.referral.referred_by.clone(),
            referrals: user.referral.referrals,
            earnings: user.referral.earnings,
            rank_progress: user.referral.rank_progress,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEmailDto {
    pub id: Uuid,
    pub email: String,
    pub status: UserStatus,
}

impl From<&User> for UserEmailDto {
    fn from(user: &User) -> Self {
        Self {
            id: Uuid::from(user.id),
            email: user.email.as_str().to_owned(),
            status: user.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub requester_email: String,
    pub amount: f64,
    pub created_at: Timestamp,
}

impl From<&Withdrawal> for WithdrawalDto {
    fn from(withdrawal: &Withdrawal) -> Self {
        Self {
            id: Uuid::from(withdrawal.id),
            user_id: Uuid::from(withdrawal.user_id),
            requester_email: withdrawal.requester_email.as_str().to_owned(),
            amount: withdrawal.amount.value(),
            created_at: withdrawal.created_at,
        }
    }
}
