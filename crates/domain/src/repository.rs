use futures::future::BoxFuture;

use crate::errors::RepositoryError;
use crate::user::{User, UserStatus};
use crate::value_objects::{UserEmail, UserId};
use crate::withdrawal::Withdrawal;

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

pub trait UserRepository: Send + Sync {
    /// 邮箱（忽略大小写）已存在时返回 `RepositoryError::Conflict`
    fn create(&self, user: User) -> RepositoryFuture<User>;
    fn update(&self, user: User) -> RepositoryFuture<User>;
    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>>;
    /// 忽略大小写匹配邮箱
    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>>;
    /// 按创建时间倒序返回全部用户
    fn list_all(&self) -> RepositoryFuture<Vec<User>>;
    fn list_by_status(&self, status: UserStatus) -> RepositoryFuture<Vec<User>>;
}

pub trait WithdrawalRepository: Send + Sync {
    fn create(&self, withdrawal: Withdrawal) -> RepositoryFuture<Withdrawal>;
    /// 最新的申请在前
    fn list_recent(&self, limit: u32) -> RepositoryFuture<Vec<Withdrawal>>;
    fn list_by_user(&self, user_id: UserId) -> RepositoryFuture<Vec<Withdrawal>>;
}
