//! 基础设施层实现。
//!
//! 提供数据库仓储、密码哈希、Redis 会话存储、图片转码与上传目录等适配器，
//! 实现应用/领域层定义的接口。

pub mod builder;
pub mod image;
pub mod migrations;
pub mod password;
pub mod repository;
pub mod session_store;

pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError};
pub use image::{LocalUploadStore, WebpImageConverter};
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{create_pg_pool, PgStorage, PgUserRepository, PgWithdrawalRepository};
pub use session_store::RedisSessionStore;
