use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use application::services::UPLOADS_URL_PREFIX;

use crate::{
    auth::require_auth,
    auth_routes, image_routes,
    middleware::{catch_panic_layer, cors_layer, expose_error_detail, with_security_headers},
    state::AppState,
    user_routes, withdrawal_routes,
};

pub fn router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let public = Router::new()
        .route("/health", get(health))
        .merge(auth_routes::public_routes())
        .merge(user_routes::public_routes())
        .merge(image_routes::routes());

    let authenticated = Router::new()
        .merge(auth_routes::authenticated_routes())
        .merge(user_routes::authenticated_routes())
        .merge(withdrawal_routes::authenticated_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let app = Router::new()
        .merge(public)
        .merge(authenticated)
        .nest_service(UPLOADS_URL_PREFIX, ServeDir::new(&settings.upload_dir))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            expose_error_detail,
        ))
        .layer(catch_panic_layer(!settings.environment.is_production()))
        .with_state(state);

    with_security_headers(app)
        .layer(cors_layer(&settings.frontend_url))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
