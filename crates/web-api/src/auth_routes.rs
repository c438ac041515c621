use axum::{
    extract::{FromRequest, Request, State},
    http::{
        header::{CONTENT_TYPE, SET_COOKIE},
        HeaderMap, StatusCode,
    },
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use application::{
    services::{AuthenticateUserRequest, RegisterUserRequest},
    ApplicationError, SessionRecord, UserDto,
};

use crate::{
    auth::{AuthUser, Claims},
    error::ApiError,
    extract::ApiJson,
    state::AppState,
};

#[derive(Debug, Deserialize)]
struct LoginPayload {
    // 缺失字段与凭证错误同样处理
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// 登录凭证，接受 JSON 或表单编码的请求体。
/// 请求体无法解析时与凭证错误返回同样的响应。
struct Credentials(LoginPayload);

impl<S> FromRequest<S> for Credentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let parsed = if is_form {
            Form::<LoginPayload>::from_request(req, state)
                .await
                .map(|Form(payload)| payload)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<LoginPayload>::from_request(req, state)
                .await
                .map(|Json(payload)| payload)
                .map_err(|rejection| rejection.body_text())
        };

        parsed.map(Credentials).map_err(|detail| {
            tracing::debug!(%detail, "unreadable login body");
            ApiError::from(ApplicationError::Authentication)
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct RegisterPayload {
    #[validate(email(message = "must be a valid email address"))]
    email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    password: String,
    #[validate(length(min = 1, message = "cannot be empty"))]
    first_name: String,
    #[validate(length(min = 1, message = "cannot be empty"))]
    last_name: String,
    phone: Option<String>,
    referred_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    message: &'static str,
    token: String,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    message: &'static str,
    user: UserDto,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ProtectedResponse {
    message: &'static str,
    user: Claims,
    session: Option<SessionRecord>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
        .route("/api/logout", post(logout))
}

pub fn authenticated_routes() -> Router<AppState> {
    Router::new().route("/api/protected-route", get(protected))
}

async fn login(
    State(state): State<AppState>,
    Credentials(payload): Credentials,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .authenticate(AuthenticateUserRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    let token = state.jwt_service.issue(&user, Utc::now())?;
    let session_id = state.session_service.start(&user).await?;
    let cookie = state.session_cookie.set_header(&session_id)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful",
            token,
        }),
    ))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<RegisterPayload>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    // 与 UserEmail 的存储口径一致，先去掉首尾空白再校验格式
    payload.email = payload.email.trim().to_owned();
    payload.validate()?;

    let user = state
        .user_service
        .register(RegisterUserRequest {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            referred_by: payload.referred_by,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Awaiting approval.",
            user: UserDto::from(&user),
        }),
    ))
}

/// 无论会话是否存在都返回成功并清除 cookie
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(session_id) = state.session_cookie.read(&headers) {
        if let Err(err) = state.session_service.end(&session_id).await {
            tracing::warn!(error = %err, "failed to destroy session on logout");
        }
    }

    let cookie = state.session_cookie.clear_header()?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}

async fn protected(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    headers: HeaderMap,
) -> Result<Json<ProtectedResponse>, ApiError> {
    let session = match state.session_cookie.read(&headers) {
        Some(session_id) => state.session_service.get(&session_id).await?,
        None => None,
    };

    Ok(Json(ProtectedResponse {
        message: "This is a protected route",
        user: claims,
        session,
    }))
}
