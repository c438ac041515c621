mod support;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use config::Environment;

use support::{build_app, login, register, send, test_app};

fn with_cookie(method: &str, uri: &str, cookie: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn login_session_is_visible_then_destroyed_on_logout() {
    let app = test_app().await;
    register(&app.router, "session@example.com", "secret1").await;

    let logged_in = login(&app.router, "session@example.com", "secret1").await;
    let token = logged_in.body["token"].as_str().unwrap().to_owned();
    let cookie = logged_in.cookie_pair().expect("session cookie");
    assert_eq!(app.sessions.len().await, 1);

    let protected = send(
        &app.router,
        with_cookie("GET", "/api/protected-route", &cookie, Some(&token)),
    )
    .await;
    assert_eq!(protected.status, StatusCode::OK);
    assert_eq!(protected.body["message"], "This is a protected route");
    assert_eq!(protected.body["user"]["email"], "session@example.com");
    assert_eq!(protected.body["session"]["email"], "session@example.com");

    let logged_out = send(&app.router, with_cookie("POST", "/api/logout", &cookie, None)).await;
    assert_eq!(logged_out.status, StatusCode::OK);
    assert_eq!(logged_out.body["message"], "Logged out successfully");
    let cleared = logged_out.set_cookie().expect("cleared cookie");
    assert!(cleared.starts_with("sid=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(app.sessions.len().await, 0);

    // 会话销毁后 token 仍然有效，但不再关联会话
    let protected = send(
        &app.router,
        with_cookie("GET", "/api/protected-route", &cookie, Some(&token)),
    )
    .await;
    assert_eq!(protected.status, StatusCode::OK);
    assert!(protected.body["session"].is_null());
}

#[tokio::test]
async fn logout_without_session_still_succeeds() {
    let app = test_app().await;

    let response = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/api/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.set_cookie().unwrap().starts_with("sid=;"));

    let forged = send(
        &app.router,
        with_cookie("POST", "/api/logout", "sid=forged.value", None),
    )
    .await;
    assert_eq!(forged.status, StatusCode::OK);
}

#[tokio::test]
async fn production_cookies_are_secure() {
    let app = build_app(Environment::Production).await;
    register(&app.router, "secure@example.com", "secret1").await;

    let logged_in = login(&app.router, "secure@example.com", "secret1").await;
    let cookie = logged_in.set_cookie().expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
}
