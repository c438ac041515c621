#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::Cursor,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use application::{
    services::{
        ImageService, ImageServiceDependencies, SessionService, SessionServiceDependencies,
        UserService, UserServiceDependencies, WithdrawalService, WithdrawalServiceDependencies,
    },
    Clock, PasswordHasher, PasswordHasherError, SessionId, SessionRecord, SessionStore,
    SessionStoreError, SystemClock,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use config::Environment;
use domain::{
    PasswordHash, RepositoryError, RepositoryFuture, User, UserEmail, UserId, UserRepository,
    UserStatus, Withdrawal, WithdrawalRepository,
};
use image::{ImageBuffer, ImageFormat, Rgba};
use infrastructure::{LocalUploadStore, WebpImageConverter};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::ServiceExt;
use uuid::Uuid;
use web_api::{router, AppState, JwtConfig, JwtService, SessionCookie, WebSettings};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const JWT_SECRET: &str = "test-secret-key";

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    data: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            if guard.values().any(|u| u.email.matches(&user.email)) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(Uuid::from(user.id), user.clone());
            Ok(user)
        })
    }

    fn update(&self, user: User) -> RepositoryFuture<User> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut guard = repo.write().await;
            let id = Uuid::from(user.id);
            if !guard.contains_key(&id) {
                return Err(RepositoryError::NotFound);
            }
            guard.insert(id, user.clone());
            Ok(user)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let repo = self.data.clone();
        Box::pin(async move { Ok(repo.read().await.get(&Uuid::from(id)).cloned()) })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let repo = self.data.clone();
        Box::pin(async move {
            Ok(repo
                .read()
                .await
                .values()
                .find(|u| u.email.matches(&email))
                .cloned())
        })
    }

    fn list_all(&self) -> RepositoryFuture<Vec<User>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut users: Vec<User> = repo.read().await.values().cloned().collect();
            users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(users)
        })
    }

    fn list_by_status(&self, status: UserStatus) -> RepositoryFuture<Vec<User>> {
        let repo = self.data.clone();
        Box::pin(async move {
            let mut users: Vec<User> = repo
                .read()
                .await
                .values()
                .filter(|u| u.status == status)
                .cloned()
                .collect();
            users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(users)
        })
    }
}

#[derive(Default, Clone)]
pub struct InMemoryWithdrawalRepository {
    data: Arc<RwLock<Vec<Withdrawal>>>,
}

impl WithdrawalRepository for InMemoryWithdrawalRepository {
    fn create(&self, withdrawal: Withdrawal) -> RepositoryFuture<Withdrawal> {
        let repo = self.data.clone();
        Box::pin(async move {
            repo.write().await.push(withdrawal.clone());
            Ok(withdrawal)
        })
    }

    fn list_recent(&self, limit: u32) -> RepositoryFuture<Vec<Withdrawal>> {
        let repo = self.data.clone();
        Box::pin(async move {
            Ok(repo
                .read()
                .await
                .iter()
                .rev()
                .take(limit as usize)
                .cloned()
                .collect())
        })
    }

    fn list_by_user(&self, user_id: UserId) -> RepositoryFuture<Vec<Withdrawal>> {
        let repo = self.data.clone();
        Box::pin(async move {
            Ok(repo
                .read()
                .await
                .iter()
                .rev()
                .filter(|w| w.user_id == user_id)
                .cloned()
                .collect())
        })
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    data: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        _ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        self.data
            .write()
            .await
            .insert(id.as_str().to_owned(), record.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
        Ok(self.data.read().await.get(id.as_str()).cloned())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        self.data.write().await.remove(id.as_str());
        Ok(())
    }
}

/// 测试中避免 bcrypt 的开销
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{plaintext}"))
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("plain:{plaintext}"))
    }
}

pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<InMemorySessionStore>,
    pub jwt: Arc<JwtService>,
    pub upload_dir: PathBuf,
    _uploads: TempDir,
}

pub async fn test_app() -> TestApp {
    build_app(Environment::Development).await
}

pub async fn build_app(environment: Environment) -> TestApp {
    let uploads = tempfile::tempdir().expect("temp upload dir");
    let upload_dir = uploads.path().join("uploads");

    let user_repository = Arc::new(InMemoryUserRepository::default());
    let withdrawal_repository = Arc::new(InMemoryWithdrawalRepository::default());
    let sessions = Arc::new(InMemorySessionStore::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(PlainPasswordHasher);

    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository: user_repository.clone(),
        password_hasher,
        clock: clock.clone(),
    }));
    user_service
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("seed admin");

    let withdrawal_service = Arc::new(WithdrawalService::new(WithdrawalServiceDependencies {
        withdrawal_repository,
        user_repository,
        clock: clock.clone(),
    }));
    let session_service = Arc::new(SessionService::new(SessionServiceDependencies {
        store: sessions.clone(),
        clock: clock.clone(),
        ttl: Duration::from_secs(86_400),
    }));
    let image_service = Arc::new(ImageService::new(ImageServiceDependencies {
        converter: Arc::new(WebpImageConverter::new()),
        store: Arc::new(LocalUploadStore::new(upload_dir.clone())),
        clock,
    }));

    let jwt = Arc::new(JwtService::new(JwtConfig {
        secret: JWT_SECRET.to_string(),
        expiration_hours: 24,
    }));
    let session_cookie = Arc::new(SessionCookie::new(
        "sid",
        "test-session-secret",
        environment.is_production(),
        Duration::from_secs(86_400),
    ));

    let state = AppState::new(
        user_service,
        withdrawal_service,
        session_service,
        image_service,
        jwt.clone(),
        session_cookie,
        WebSettings {
            environment,
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: upload_dir.clone(),
            max_upload_bytes: 10 * 1024 * 1024,
        },
    );

    TestApp {
        router: router(state),
        sessions,
        jwt,
        upload_dir,
        _uploads: uploads,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: Value,
}

impl TestResponse {
    /// `Set-Cookie` 中的 `name=value` 部分
    pub fn cookie_pair(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned)
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec();
    let body = serde_json::from_slice(&bytes).unwrap_or(json!({}));
    TestResponse {
        status,
        headers,
        bytes,
        body,
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn register(app: &Router, email: &str, password: &str) -> TestResponse {
    send(
        app,
        json_request(
            "POST",
            "/api/register",
            None,
            json!({
                "email": email,
                "password": password,
                "firstName": "Test",
                "lastName": "User",
                "phone": "555-0100",
                "referredBy": "REF42"
            }),
        ),
    )
    .await
}

pub async fn login(app: &Router, email: &str, password: &str) -> TestResponse {
    send(
        app,
        json_request(
            "POST",
            "/api/login",
            None,
            json!({ "email": email, "password": password }),
        ),
    )
    .await
}

/// 登录并返回 token
pub async fn login_token(app: &Router, email: &str, password: &str) -> String {
    let response = login(app, email, password).await;
    assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
    response.body["token"].as_str().expect("token").to_owned()
}

pub fn multipart_request(uri: &str, field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "portal-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x * 30) as u8, (y * 30) as u8, 200, 255])
    });
    let mut bytes = Cursor::new(Vec::new());
    buffer.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}
