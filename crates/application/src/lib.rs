//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验，
//! 以及对外部适配器（密码哈希、会话存储、图片转码）的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod image;
pub mod password;
pub mod services;
pub mod session;

pub use clock::{Clock, SystemClock};
pub use dto::{UserDto, UserEmailDto, WithdrawalDto};
pub use error::ApplicationError;
pub use image::{ImageConverter, ImageError, UploadStore};
pub use password::{
    ensure_password_length, PasswordHasher, PasswordHasherError, MIN_PASSWORD_LENGTH,
};
pub use services::{
    ImageService, SessionService, UserService, WithdrawalService,
};
pub use session::{SessionId, SessionRecord, SessionStore, SessionStoreError};
