//! JWT 认证和授权模块
//!
//! 提供 JWT token 签发与验证、认证中间件以及 `AuthUser` / `AdminUser` 提取器。

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use config::JwtConfig;
use domain::{User, UserRole};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// JWT Claims 结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// JWT Token 服务
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为用户签发 token，有效期由配置决定
    pub fn issue(&self, user: &User, now: DateTime<Utc>) -> Result<String, ApiError> {
        let claims = Claims {
            id: Uuid::from(user.id),
            email: user.email.as_str().to_owned(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.expiration_hours)).timestamp(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|err| {
            ApiError::internal_server_error(format!("token generation failed: {err}"))
        })
    }

    /// 验证签名与过期时间
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
    }
}

/// 取 `Authorization` 头中以空白分隔的第二段
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}

/// 认证中间件：校验 token 并把 Claims 放入请求扩展
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| ApiError::unauthorized("Unauthorized, token missing"))?;

    let claims = state.jwt_service.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        ApiError::forbidden("INVALID_TOKEN", "Invalid token")
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// 已认证的调用方
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized, token missing"))
    }
}

/// 管理员调用方；非管理员返回 403
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            tracing::warn!(user_id = %claims.id, "non-admin attempted admin route");
            return Err(ApiError::forbidden("ACCESS_DENIED", "Access denied"));
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use domain::{PasswordHash, UserEmail, UserId, UserProfile};

    fn service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "unit-test-secret".into(),
            expiration_hours: 24,
        })
    }

    fn user() -> User {
        User::register(
            UserId::from(Uuid::new_v4()),
            UserEmail::parse("jwt@example.com").unwrap(),
            PasswordHash::new("hash").unwrap(),
            UserProfile::new("Jay", "Doe", None).unwrap(),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn issued_token_carries_identity() {
        let service = service();
        let user = user();
        let now = Utc::now();
        let token = service.issue(&user, now).unwrap();

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.id, Uuid::from(user.id));
        assert_eq!(claims.email, "jwt@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new(JwtConfig {
            secret: "another-secret".into(),
            expiration_hours: 24,
        });
        let token = other.issue(&user(), Utc::now()).unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(25);
        let token = service().issue(&user(), issued).unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn bearer_is_second_token_of_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   abc.def"));
        assert_eq!(extract_bearer(&headers), Some("abc.def"));
    }
}
