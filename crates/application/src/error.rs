use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::{image::ImageError, password::PasswordHasherError, session::SessionStoreError};

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("session store error: {0}")]
    Session(#[from] SessionStoreError),
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    /// 登录失败，不区分邮箱不存在与密码错误
    #[error("authentication failed")]
    Authentication,
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}
