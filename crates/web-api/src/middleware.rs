//! 全局中间件：安全响应头、跨域、错误详情与 panic 兜底

use std::any::Any;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{self, HeaderName},
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
};

use crate::{error::ErrorDetail, state::AppState};

/// 与 helmet 默认值一致的安全响应头
const SECURITY_HEADERS: [(&str, &str); 10] = [
    (
        "content-security-policy",
        "default-src 'self'; img-src 'self' data:; object-src 'none'; frame-ancestors 'self'",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-site"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-xss-protection", "0"),
];

pub fn with_security_headers(mut router: Router) -> Router {
    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }
    router
}

/// 只允许配置的前端地址携带凭证跨域
pub fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(err) => {
            tracing::warn!(frontend_url, error = %err, "invalid FRONTEND_URL, cross-origin requests disabled");
            cors
        }
    }
}

/// 开发环境下把内部错误详情写入响应体的 `error` 字段
pub async fn expose_error_detail(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if state.settings.environment.is_production() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = json!({
        "code": detail.body.code,
        "message": detail.body.message,
        "error": detail.detail,
    });
    Response::from_parts(parts, Body::from(body.to_string()))
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// handler panic 时返回通用 500
pub fn catch_panic_layer(
    expose_detail: bool,
) -> CatchPanicLayer<impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone> {
    CatchPanicLayer::custom(move |err: Box<dyn Any + Send + 'static>| {
        let detail = panic_message(err.as_ref());
        tracing::error!(panic = %detail, "handler panicked");

        let mut body = json!({
            "code": "INTERNAL_ERROR",
            "message": "An unexpected error occurred",
        });
        if expose_detail {
            body["error"] = json!(detail);
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    })
}
