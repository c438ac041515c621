//! 会话 cookie
//!
//! cookie 值为 `<session id>.<HMAC-SHA256 签名>`，签名使用 base64url 编码。

use std::time::Duration;

use application::SessionId;
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use data_encoding::BASE64URL_NOPAD;
use ring::hmac;

use crate::error::ApiError;

#[derive(Clone)]
pub struct SessionCookie {
    name: String,
    key: hmac::Key,
    secure: bool,
    max_age: Duration,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, secret: &str, secure: bool, max_age: Duration) -> Self {
        Self {
            name: name.into(),
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
            secure,
            max_age,
        }
    }

    fn sign(&self, id: &SessionId) -> String {
        let tag = hmac::sign(&self.key, id.as_str().as_bytes());
        format!("{}.{}", id.as_str(), BASE64URL_NOPAD.encode(tag.as_ref()))
    }

    /// 校验签名，失败或格式不符时返回 None
    pub fn verify(&self, value: &str) -> Option<SessionId> {
        let (id, signature) = value.split_once('.')?;
        let signature = BASE64URL_NOPAD.decode(signature.as_bytes()).ok()?;
        hmac::verify(&self.key, id.as_bytes(), &signature).ok()?;
        SessionId::parse(id)
    }

    /// 从请求的 Cookie 头中读取会话 ID
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .and_then(|(_, value)| self.verify(value))
    }

    fn attributes(&self, max_age: u64) -> String {
        let mut attributes = format!("Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
        if self.secure {
            attributes.push_str("; Secure");
        }
        attributes
    }

    pub fn set_header(&self, id: &SessionId) -> Result<HeaderValue, ApiError> {
        let cookie = format!(
            "{}={}; {}",
            self.name,
            self.sign(id),
            self.attributes(self.max_age.as_secs())
        );
        HeaderValue::from_str(&cookie)
            .map_err(|err| ApiError::internal_server_error(format!("invalid cookie: {err}")))
    }

    pub fn clear_header(&self) -> Result<HeaderValue, ApiError> {
        let cookie = format!("{}=; {}", self.name, self.attributes(0));
        HeaderValue::from_str(&cookie)
            .map_err(|err| ApiError::internal_server_error(format!("invalid cookie: {err}")))
    }
}
