use std::sync::Arc;

use domain::{
    DomainError, RepositoryError, User, UserEmail, UserId, UserProfile, UserRepository, UserStatus,
};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::ApplicationError,
    password::{ensure_password_length, PasswordHasher, PasswordHasherError},
};

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub referred_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticateUserRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ChangePasswordRequest {
    pub user_id: Uuid,
    pub current_password: String,
    pub new_password: String,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    /// 注册新用户，初始状态为待审核
    pub async fn register(&self, request: RegisterUserRequest) -> Result<User, ApplicationError> {
        let email = UserEmail::parse(request.email)?;
        let profile = UserProfile::new(request.first_name, request.last_name, request.phone)?;
        ensure_password_length("password", &request.password)?;

        if self
            .deps
            .user_repository
            .find_by_email(email.clone())
            .await?
            .is_some()
        {
            return Err(ApplicationError::Domain(DomainError::UserAlreadyExists));
        }

        let password_hash = self.deps.password_hasher.hash(&request.password).await?;

        let user = User::register(
            UserId::from(Uuid::new_v4()),
            email,
            password_hash,
            profile,
            request.referred_by,
            self.deps.clock.now(),
        );

        let stored = self
            .deps
            .user_repository
            .create(user)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationError::Domain(DomainError::UserAlreadyExists)
                }
                other => ApplicationError::from(other),
            })?;

        tracing::info!(user_id = %stored.id, "user registered, awaiting approval");
        Ok(stored)
    }

    /// 校验邮箱与密码；任何失败都返回同一个认证错误
    pub async fn authenticate(
        &self,
        request: AuthenticateUserRequest,
    ) -> Result<User, ApplicationError> {
        let email = UserEmail::parse(request.email).map_err(|_| ApplicationError::Authentication)?;
        let user = self
            .deps
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(ApplicationError::Authentication)?;

        let password_ok = match self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await
        {
            Ok(matched) => matched,
            // 存储的哈希损坏时按密码不匹配处理
            Err(PasswordHasherError::Verify(reason)) => {
                tracing::warn!(user_id = %user.id, %reason, "stored password hash is unreadable");
                false
            }
            Err(err) => return Err(err.into()),
        };
        if !password_ok {
            return Err(ApplicationError::Authentication);
        }

        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User, ApplicationError> {
        self.deps
            .user_repository
            .find_by_id(UserId::from(user_id))
            .await?
            .ok_or(ApplicationError::Domain(DomainError::UserNotFound))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApplicationError> {
        Ok(self.deps.user_repository.list_all().await?)
    }

    pub async fn list_pending(&self) -> Result<Vec<User>, ApplicationError> {
        Ok(self
            .deps
            .user_repository
            .list_by_status(UserStatus::Pending)
            .await?)
    }

    pub async fn approve(&self, user_id: Uuid) -> Result<User, ApplicationError> {
        let mut user = self.get_user(user_id).await?;
        user.approve(self.deps.clock.now());
        let stored = self.deps.user_repository.update(user).await?;
        tracing::info!(user_id = %stored.id, "user approved");
        Ok(stored)
    }

    pub async fn reject(&self, user_id: Uuid) -> Result<User, ApplicationError> {
        let mut user = self.get_user(user_id).await?;
        user.reject(self.deps.clock.now());
        let stored = self.deps.user_repository.update(user).await?;
        tracing::info!(user_id = %stored.id, "user rejected");
        Ok(stored)
    }

    pub async fn change_password(
        &self,
        request: ChangePasswordRequest,
    ) -> Result<(), ApplicationError> {
        let mut user = self.get_user(request.user_id).await?;

        let current_ok = self
            .deps
            .password_hasher
            .verify(&request.current_password, &user.password)
            .await?;
        if !current_ok {
            return Err(ApplicationError::Domain(DomainError::InvalidCurrentPassword));
        }
        ensure_password_length("newPassword", &request.new_password)?;

        let password_hash = self
            .deps
            .password_hasher
            .hash(&request.new_password)
            .await?;
        user.set_password(password_hash, self.deps.clock.now());
        self.deps.user_repository.update(user).await?;

        tracing::info!(user_id = %request.user_id, "password changed");
        Ok(())
    }

    /// 确保存在指定邮箱的管理员账号；返回是否新建
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, ApplicationError> {
        let email = UserEmail::parse(email)?;
        if let Some(existing) = self
            .deps
            .user_repository
            .find_by_email(email.clone())
            .await?
        {
            if !existing.is_admin() {
                tracing::warn!(user_id = %existing.id, "admin seed email belongs to a non-admin user");
            }
            return Ok(false);
        }

        ensure_password_length("password", password)?;
        let password_hash = self.deps.password_hasher.hash(password).await?;
        let now = self.deps.clock.now();
        let mut admin = User::register(
            UserId::from(Uuid::new_v4()),
            email,
            password_hash,
            UserProfile::new("Portal", "Administrator", None)?,
            None,
            now,
        );
        admin.grant_admin(now);
        admin.approve(now);

        let stored = self.deps.user_repository.create(admin).await?;
        tracing::info!(user_id = %stored.id, "admin account created");
        Ok(true)
    }
}
