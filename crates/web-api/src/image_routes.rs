use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::{error::ApiError, extract::file_field, state::AppState};

#[derive(Debug, Serialize)]
struct WebpUrlResponse {
    #[serde(rename = "webpUrl")]
    webp_url: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/convert-to-webp", post(convert_to_webp))
        .route("/api/upload-webp", post(upload_webp))
        .route("/upload", post(convert_and_download))
}

/// 转码后写入上传目录，返回可访问的 URL
async fn convert_to_webp(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<WebpUrlResponse>, ApiError> {
    let input = file_field(multipart, "image").await?;
    let stored = state.image_service.convert_and_store(input).await?;
    Ok(Json(WebpUrlResponse {
        webp_url: stored.url,
    }))
}

/// 客户端已转好的 WebP，原样保存
async fn upload_webp(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<WebpUrlResponse>, ApiError> {
    let input = file_field(multipart, "webpFile").await?;
    let stored = state.image_service.store_webp(input).await?;
    Ok(Json(WebpUrlResponse {
        webp_url: stored.url,
    }))
}

/// 转码后直接作为附件返回
async fn convert_and_download(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let input = file_field(multipart, "image").await?;
    let converted = state.image_service.convert(input).await.map_err(|err| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "IMAGE_CONVERSION_ERROR",
            "Error converting image to WebP",
        )
        .with_detail(err.to_string())
    })?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename={}",
        converted.file_name
    ))
    .map_err(|err| ApiError::internal_server_error(err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/webp")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        converted.bytes,
    )
        .into_response())
}
