use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
};

use crate::error::ApiError;

/// JSON 请求体，解析失败时返回统一的错误结构
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// 查询字符串，解析失败时同样返回 JSON 错误体
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

fn no_file() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "NO_FILE", "No file uploaded")
}

/// 读取指定字段的文件内容；字段缺失或为空时返回 400
pub async fn file_field(
    multipart: Result<Multipart, MultipartRejection>,
    field_name: &str,
) -> Result<Vec<u8>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "request is not multipart");
        no_file()
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::new(err.status(), "UPLOAD_ERROR", err.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::new(err.status(), "UPLOAD_ERROR", err.body_text()))?;
        if bytes.is_empty() {
            break;
        }
        return Ok(bytes.to_vec());
    }

    Err(no_file())
}
