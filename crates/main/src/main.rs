//! 主应用程序入口
//!
//! 加载配置、连接 Postgres 与 Redis、启动 Axum Web API 服务。

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use application::{
    services::{
        ImageService, ImageServiceDependencies, SessionService, SessionServiceDependencies,
        UserService, UserServiceDependencies, WithdrawalService, WithdrawalServiceDependencies,
    },
    Clock, SystemClock,
};
use config::AppConfig;
use infrastructure::{Infrastructure, InfrastructureConfig};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService, SessionCookie, WebSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // 缺少必需的环境变量时在连接任何外部服务之前退出
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(config = %config.summary(), "configuration loaded");

    let upload_dir = PathBuf::from(&config.server.upload_dir);
    let infrastructure = Infrastructure::connect(InfrastructureConfig {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        bcrypt_cost: config.server.bcrypt_cost,
        redis_url: config.redis.url.clone(),
        upload_dir: upload_dir.clone(),
    })
    .await
    .context("failed to initialise infrastructure")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let user_service = Arc::new(UserService::new(UserServiceDependencies {
        user_repository: infrastructure.user_repository(),
        password_hasher: infrastructure.password_hasher_trait(),
        clock: clock.clone(),
    }));

    if let Some(admin) = &config.admin {
        let created = user_service
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("failed to ensure admin account")?;
        if created {
            tracing::info!(email = %admin.email, "admin account seeded");
        }
    }

    let withdrawal_service = Arc::new(WithdrawalService::new(WithdrawalServiceDependencies {
        withdrawal_repository: infrastructure.withdrawal_repository(),
        user_repository: infrastructure.user_repository(),
        clock: clock.clone(),
    }));

    let session_ttl = Duration::from_secs(config.session.ttl_seconds);
    let session_service = Arc::new(SessionService::new(SessionServiceDependencies {
        store: infrastructure.session_store_trait(),
        clock: clock.clone(),
        ttl: session_ttl,
    }));

    let image_service = Arc::new(ImageService::new(ImageServiceDependencies {
        converter: infrastructure.image_converter_trait(),
        store: infrastructure.upload_store_trait(),
        clock,
    }));

    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
    let session_cookie = Arc::new(SessionCookie::new(
        config.session.cookie_name.clone(),
        &config.session.secret,
        config.environment.is_production(),
        session_ttl,
    ));

    let state = AppState::new(
        user_service,
        withdrawal_service,
        session_service,
        image_service,
        jwt_service,
        session_cookie,
        WebSettings {
            environment: config.environment,
            frontend_url: config.server.frontend_url.clone(),
            upload_dir,
            max_upload_bytes: config.server.max_upload_bytes,
        },
    );

    // 启动 Web 服务器
    let app = router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "member portal listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    infrastructure.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
