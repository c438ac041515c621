use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{PasswordHash, Timestamp, UserEmail, UserId};

/// 审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "Pending",
            UserStatus::Approved => "Approved",
            UserStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(UserStatus::Pending),
            "Approved" => Ok(UserStatus::Approved),
            "Rejected" => Ok(UserStatus::Rejected),
            other => Err(DomainError::invalid_argument(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(DomainError::invalid_argument(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

/// 注册时填写的个人资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl UserProfile {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: Option<String>,
    ) -> Result<Self, DomainError> {
        let first_name = first_name.into().trim().to_owned();
        let last_name = last_name.into().trim().to_owned();
        if first_name.is_empty() {
            return Err(DomainError::invalid_argument("firstName", "cannot be empty"));
        }
        if last_name.is_empty() {
            return Err(DomainError::invalid_argument("lastName", "cannot be empty"));
        }
        let phone = phone
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            first_name,
            last_name,
            phone,
        })
    }
}

/// 推荐与收益相关字段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferralStats {
    pub referred_by: Option<String>,
    pub referrals: i32,
    pub earnings: f64,
    /// 距离下一等级的进度（0-100）
    pub rank_progress: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: UserEmail,
    #[serde(skip_serializing)] // 密码字段不暴露给客户端
    pub password: PasswordHash,
    pub role: UserRole,
    pub status: UserStatus,
    pub profile: UserProfile,
    pub referral: ReferralStats,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// 注册新用户，默认为待审核的普通用户
    pub fn register(
        id: UserId,
        email: UserEmail,
        password: PasswordHash,
        profile: UserProfile,
        referred_by: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            password,
            role: UserRole::User,
            status: UserStatus::Pending,
            profile,
            referral: ReferralStats {
                referred_by: referred_by
                    .map(|code| code.trim().to_owned())
                    .filter(|code| !code.is_empty()),
                ..ReferralStats::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn approve(&mut self, now: Timestamp) {
        self.status = UserStatus::Approved;
        self.updated_at = now;
    }

    pub fn reject(&mut self, now: Timestamp) {
        self.status = UserStatus::Rejected;
        self.updated_at = now;
    }

    pub fn grant_admin(&mut self, now: Timestamp) {
        self.role = UserRole::Admin;
        self.updated_at = now;
    }

    pub fn set_password(&mut self, password: PasswordHash, now: Timestamp) {
        self.password = password;
        self.updated_at = now;
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
