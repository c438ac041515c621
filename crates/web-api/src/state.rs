use std::{path::PathBuf, sync::Arc};

use application::{ImageService, SessionService, UserService, WithdrawalService};
use config::Environment;

use crate::{auth::JwtService, session_cookie::SessionCookie};

/// HTTP 层自身需要的配置
#[derive(Debug, Clone)]
pub struct WebSettings {
    pub environment: Environment,
    /// 允许跨域携带凭证的前端地址
    pub frontend_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub withdrawal_service: Arc<WithdrawalService>,
    pub session_service: Arc<SessionService>,
    pub image_service: Arc<ImageService>,
    pub jwt_service: Arc<JwtService>,
    pub session_cookie: Arc<SessionCookie>,
    pub settings: Arc<WebSettings>,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        withdrawal_service: Arc<WithdrawalService>,
        session_service: Arc<SessionService>,
        image_service: Arc<ImageService>,
        jwt_service: Arc<JwtService>,
        session_cookie: Arc<SessionCookie>,
        settings: WebSettings,
    ) -> Self {
        Self {
            user_service,
            withdrawal_service,
            session_service,
            image_service,
            jwt_service,
            session_cookie,
            settings: Arc::new(settings),
        }
    }
}
