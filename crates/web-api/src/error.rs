use application::{ApplicationError, ImageError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;
use validator::ValidationErrors;

const GENERIC_SERVER_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// 随响应传递的内部错误详情，仅在开发环境写入响应体
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub body: ErrorBody,
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
            detail: None,
        }
    }

    /// 附加内部错误详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, message)
    }

    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            GENERIC_SERVER_ERROR,
        )
        .with_detail(detail)
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;

        match error {
            AppErr::Domain(DomainError::InvalidArgument { field, reason }) => {
                ApiError::validation(format!("{field} {reason}"))
            }
            AppErr::Domain(DomainError::UserAlreadyExists) => {
                ApiError::new(StatusCode::CONFLICT, "USER_EXISTS", "User already exists")
            }
            AppErr::Domain(DomainError::UserNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found")
            }
            AppErr::Domain(DomainError::InvalidCurrentPassword) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_PASSWORD",
                "Current password is incorrect",
            ),
            AppErr::Authentication => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ),
            AppErr::Repository(RepositoryError::NotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
            }
            AppErr::Repository(RepositoryError::Conflict) => {
                ApiError::new(StatusCode::CONFLICT, "CONFLICT", "Resource already exists")
            }
            AppErr::Repository(err @ RepositoryError::Storage { .. }) => {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    GENERIC_SERVER_ERROR,
                )
                .with_detail(err.to_string())
            }
            AppErr::Image(err @ (ImageError::Decode(_) | ImageError::Encode(_))) => {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IMAGE_PROCESSING_ERROR",
                    "Error processing image",
                )
                .with_detail(err.to_string())
            }
            AppErr::Image(err @ ImageError::Storage(_)) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPLOAD_ERROR",
                GENERIC_SERVER_ERROR,
            )
            .with_detail(err.to_string()),
            AppErr::Session(err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_ERROR",
                GENERIC_SERVER_ERROR,
            )
            .with_detail(err.to_string()),
            AppErr::Password(err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PASSWORD_ERROR",
                GENERIC_SERVER_ERROR,
            )
            .with_detail(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|err| err.message.as_ref())
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                format!("{field} {reason}")
            })
            .collect();
        fields.sort();
        ApiError::validation(fields.join(", "))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = self.body.code,
                detail = self.detail.as_deref().unwrap_or_default(),
                "request failed"
            );
        }

        let detail = self.detail.map(|detail| ErrorDetail {
            body: self.body.clone(),
            detail,
        });
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_are_generic_bad_requests() {
        let err = ApiError::from(ApplicationError::Authentication);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
    }

    #[test]
    fn storage_errors_hide_their_message() {
        let err = ApiError::from(ApplicationError::from(RepositoryError::storage(
            "connection refused",
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message, GENERIC_SERVER_ERROR);
        assert_eq!(err.detail.as_deref(), Some("storage error: connection refused"));
    }

    #[test]
    fn server_errors_carry_detail_in_extensions() {
        let response = ApiError::internal_server_error("boom").into_response();
        let detail = response.extensions().get::<ErrorDetail>().unwrap();
        assert_eq!(detail.detail, "boom");
        assert_eq!(detail.body.code, "INTERNAL_ERROR");
    }
}
