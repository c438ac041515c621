use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use application::{services::SubmitWithdrawalRequest, WithdrawalDto};

use crate::{
    auth::{AdminUser, AuthUser},
    error::ApiError,
    extract::{ApiJson, ApiQuery},
    state::AppState,
};

#[derive(Debug, Deserialize)]
struct WithdrawPayload {
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WithdrawResponse {
    message: &'static str,
    withdrawal: WithdrawalDto,
}

pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/api/withdraw", post(submit_withdrawal).get(list_withdrawals))
        .route("/api/withdraw/mine", get(list_own_withdrawals))
}

async fn submit_withdrawal(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(payload): ApiJson<WithdrawPayload>,
) -> Result<(StatusCode, Json<WithdrawResponse>), ApiError> {
    let withdrawal = state
        .withdrawal_service
        .submit(SubmitWithdrawalRequest {
            user_id: claims.id,
            amount: payload.amount,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WithdrawResponse {
            message: "Withdrawal request submitted",
            withdrawal: WithdrawalDto::from(&withdrawal),
        }),
    ))
}

async fn list_withdrawals(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<WithdrawalDto>>, ApiError> {
    let withdrawals = state.withdrawal_service.list_recent(query.limit).await?;
    Ok(Json(withdrawals.iter().map(WithdrawalDto::from).collect()))
}

async fn list_own_withdrawals(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<WithdrawalDto>>, ApiError> {
    let withdrawals = state.withdrawal_service.list_for_user(claims.id).await?;
    Ok(Json(withdrawals.iter().map(WithdrawalDto::from).collect()))
}
