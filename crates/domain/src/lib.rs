//! 会员门户核心领域模型
//!
//! 包含用户、提现申请等核心实体，以及仓储接口和错误定义。

pub mod errors;
pub mod repository;
pub mod user;
pub mod value_objects;
pub mod withdrawal;

// 重新导出常用类型
pub use errors::*;
pub use repository::*;
pub use user::*;
pub use value_objects::*;
pub use withdrawal::*;
