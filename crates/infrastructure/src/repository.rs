use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::{
    Amount, PasswordHash, ReferralStats, RepositoryError, RepositoryFuture, User, UserEmail,
    UserId, UserProfile, UserRepository, UserRole, UserStatus, Withdrawal, WithdrawalId,
    WithdrawalRepository,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, role, status, first_name, last_name, phone, \
     referred_by, referrals, earnings, rank_progress, created_at, updated_at";

const WITHDRAWAL_COLUMNS: &str = "id, user_id, requester_email, amount, created_at";

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::storage(err.to_string()),
    }
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    referred_by: Option<String>,
    referrals: i32,
    earnings: f64,
    rank_progress: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let email = UserEmail::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let password =
            PasswordHash::new(value.password_hash).map_err(|err| invalid_data(err.to_string()))?;
        let role = value
            .role
            .parse::<UserRole>()
            .map_err(|err| invalid_data(err.to_string()))?;
        let status = value
            .status
            .parse::<UserStatus>()
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::from(value.id),
            email,
            password,
            role,
            status,
            // 直接还原已入库的资料，不再重复校验
            profile: UserProfile {
                first_name: value.first_name,
                last_name: value.last_name,
                phone: value.phone,
            },
            referral: ReferralStats {
                referred_by: value.referred_by,
                referrals: value.referrals,
                earnings: value.earnings,
                rank_progress: value.rank_progress,
            },
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct WithdrawalRecord {
    id: Uuid,
    user_id: Uuid,
    requester_email: String,
    amount: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<WithdrawalRecord> for Withdrawal {
    type Error = RepositoryError;

    fn try_from(value: WithdrawalRecord) -> Result<Self, Self::Error> {
        let requester_email =
            UserEmail::parse(value.requester_email).map_err(|err| invalid_data(err.to_string()))?;
        let amount = Amount::parse(value.amount).map_err(|err| invalid_data(err.to_string()))?;

        Ok(Withdrawal {
            id: WithdrawalId::from(value.id),
            user_id: UserId::from(value.user_id),
            requester_email,
            amount,
            created_at: value.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                r#"
                INSERT INTO users ({USER_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                RETURNING {USER_COLUMNS}
                "#
            );
            let record = sqlx::query_as::<_, UserRecord>(&sql)
                .bind(Uuid::from(user.id))
                .bind(user.email.as_str())
                .bind(user.password.as_str())
                .bind(user.role.as_str())
                .bind(user.status.as_str())
                .bind(&user.profile.first_name)
                .bind(&user.profile.last_name)
                .bind(&user.profile.phone)
                .bind(&user.referral.referred_by)
                .bind(user.referral.referrals)
                .bind(user.referral.earnings)
                .bind(user.referral.rank_progress)
                .bind(user.created_at)
                .bind(user.updated_at)
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    fn update(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                r#"
                UPDATE users
                SET email = $2, password_hash = $3, role = $4, status = $5,
                    first_name = $6, last_name = $7, phone = $8, referred_by = $9,
                    referrals = $10, earnings = $11, rank_progress = $12, updated_at = $13
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            );
            let record = sqlx::query_as::<_, UserRecord>(&sql)
                .bind(Uuid::from(user.id))
                .bind(user.email.as_str())
                .bind(user.password.as_str())
                .bind(user.role.as_str())
                .bind(user.status.as_str())
                .bind(&user.profile.first_name)
                .bind(&user.profile.last_name)
                .bind(&user.profile.phone)
                .bind(&user.referral.referred_by)
                .bind(user.referral.referrals)
                .bind(user.referral.earnings)
                .bind(user.referral.rank_progress)
                .bind(user.updated_at)
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?
                .ok_or(RepositoryError::NotFound)?;

            User::try_from(record)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
            let record = sqlx::query_as::<_, UserRecord>(&sql)
                .bind(Uuid::from(id))
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // 与唯一索引 users_email_lower_idx 一致
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
            let record = sqlx::query_as::<_, UserRecord>(&sql)
                .bind(email.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn list_all(&self) -> RepositoryFuture<Vec<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
            let records = sqlx::query_as::<_, UserRecord>(&sql)
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_err)?;

            records.into_iter().map(User::try_from).collect()
        })
    }

    fn list_by_status(&self, status: UserStatus) -> RepositoryFuture<Vec<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users WHERE status = $1 ORDER BY created_at DESC"
            );
            let records = sqlx::query_as::<_, UserRecord>(&sql)
                .bind(status.as_str())
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_err)?;

            records.into_iter().map(User::try_from).collect()
        })
    }
}

#[derive(Clone)]
pub struct PgWithdrawalRepository {
    pool: PgPool,
}

impl PgWithdrawalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl WithdrawalRepository for PgWithdrawalRepository {
    fn create(&self, withdrawal: Withdrawal) -> RepositoryFuture<Withdrawal> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                r#"
                INSERT INTO withdrawals ({WITHDRAWAL_COLUMNS})
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {WITHDRAWAL_COLUMNS}
                "#
            );
            let record = sqlx::query_as::<_, WithdrawalRecord>(&sql)
                .bind(Uuid::from(withdrawal.id))
                .bind(Uuid::from(withdrawal.user_id))
                .bind(withdrawal.requester_email.as_str())
                .bind(withdrawal.amount.value())
                .bind(withdrawal.created_at)
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)?;

            Withdrawal::try_from(record)
        })
    }

    fn list_recent(&self, limit: u32) -> RepositoryFuture<Vec<Withdrawal>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals ORDER BY created_at DESC LIMIT $1"
            );
            let records = sqlx::query_as::<_, WithdrawalRecord>(&sql)
                .bind(i64::from(limit))
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_err)?;

            records.into_iter().map(Withdrawal::try_from).collect()
        })
    }

    fn list_by_user(&self, user_id: UserId) -> RepositoryFuture<Vec<Withdrawal>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let sql = format!(
                "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE user_id = $1 ORDER BY created_at DESC"
            );
            let records = sqlx::query_as::<_, WithdrawalRecord>(&sql)
                .bind(Uuid::from(user_id))
                .fetch_all(&pool)
                .await
                .map_err(map_sqlx_err)?;

            records.into_iter().map(Withdrawal::try_from).collect()
        })
    }
}

/// 共享同一个连接池的仓储集合
#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub withdrawal_repository: Arc<PgWithdrawalRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            withdrawal_repository: Arc::new(PgWithdrawalRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
