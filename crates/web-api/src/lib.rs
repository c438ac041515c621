//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。

mod auth;
mod auth_routes;
mod error;
mod extract;
mod image_routes;
mod middleware;
mod routes;
mod session_cookie;
mod state;
mod user_routes;
mod withdrawal_routes;

pub use auth::{AdminUser, AuthUser, Claims, JwtService};
pub use config::JwtConfig;
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use session_cookie::SessionCookie;
pub use state::{AppState, WebSettings};
