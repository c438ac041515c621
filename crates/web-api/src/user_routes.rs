use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use application::{services::ChangePasswordRequest, UserDto, UserEmailDto};

use crate::{
    auth::{AdminUser, AuthUser},
    error::ApiError,
    extract::ApiJson,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordPayload {
    current_password: String,
    new_password: String,
}

#[derive(Debug, Serialize)]
struct UserActionResponse {
    message: &'static str,
    user: UserDto,
}

#[derive(Debug, Serialize)]
struct UserDataResponse {
    user: UserDto,
}

#[derive(Debug, Serialize)]
struct FoundUserResponse {
    id: Uuid,
    email: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/api/findusers/{id}", get(find_user))
}

/// 需要 `require_auth` 中间件；管理员接口额外通过 `AdminUser` 校验角色
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/pending", get(list_pending))
        .route("/api/users_email", get(list_user_emails))
        .route("/api/approve/{id}", put(approve_user))
        .route("/api/reject/{id}", put(reject_user))
        .route("/api/userdata", get(user_data))
        .route("/api/change", put(change_password).post(change_password))
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid user id"))
}

async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.iter().map(UserDto::from).collect()))
}

async fn list_pending(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.user_service.list_pending().await?;
    Ok(Json(users.iter().map(UserDto::from).collect()))
}

async fn list_user_emails(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserEmailDto>>, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.iter().map(UserEmailDto::from).collect()))
}

async fn approve_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserActionResponse>, ApiError> {
    let user = state.user_service.approve(parse_user_id(&id)?).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, "approval recorded");
    Ok(Json(UserActionResponse {
        message: "User approved",
        user: UserDto::from(&user),
    }))
}

async fn reject_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<UserActionResponse>, ApiError> {
    let user = state.user_service.reject(parse_user_id(&id)?).await?;
    tracing::info!(admin_id = %admin.id, user_id = %user.id, "rejection recorded");
    Ok(Json(UserActionResponse {
        message: "User rejected",
        user: UserDto::from(&user),
    }))
}

async fn user_data(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserDataResponse>, ApiError> {
    let user = state.user_service.get_user(claims.id).await?;
    Ok(Json(UserDataResponse {
        user: UserDto::from(&user),
    }))
}

async fn find_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FoundUserResponse>, ApiError> {
    let user = state.user_service.get_user(parse_user_id(&id)?).await?;
    Ok(Json(FoundUserResponse {
        id: Uuid::from(user.id),
        email: user.email.as_str().to_owned(),
    }))
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(payload): ApiJson<ChangePasswordPayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .user_service
        .change_password(ChangePasswordRequest {
            user_id: claims.id,
            current_password: payload.current_password,
            new_password: payload.new_password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}
