//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 运行环境与 HTTP 服务
//! - 数据库与 Redis 连接
//! - JWT 认证与会话
//! - 上传目录
//!
//! 非敏感配置按 默认值 -> 可选 TOML 文件 (APP_CONFIG_FILE) -> 环境变量 的顺序合并；
//! 密钥与连接串只从环境变量读取，缺失时加载失败。

use std::env;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// 必须存在的环境变量
pub const REQUIRED_VARIABLES: [&str; 4] = ["JWT_SECRET", "SESSION_SECRET", "DATABASE_URL", "REDIS_URL"];

/// 运行环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// 全局应用配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    /// 启动时确保存在的管理员账号
    pub admin: Option<AdminSeed>,
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域访问的前端地址
    pub frontend_url: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub bcrypt_cost: Option<u32>,
}

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Redis配置
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// JWT配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

/// 会话配置
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: u64,
    pub cookie_name: String,
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// 可由配置文件或环境变量覆盖的非敏感配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app_env: Environment,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
    pub jwt_expiration_hours: i64,
    pub session_ttl_seconds: u64,
    pub session_cookie_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcrypt_cost: Option<u32>,
}

impl Settings {
    /// 对应的环境变量名（figment 会转为小写字段名）
    pub const ENV_KEYS: [&'static str; 11] = [
        "APP_ENV",
        "HOST",
        "PORT",
        "FRONTEND_URL",
        "UPLOAD_DIR",
        "MAX_UPLOAD_BYTES",
        "DB_MAX_CONNECTIONS",
        "JWT_EXPIRATION_HOURS",
        "SESSION_TTL_SECONDS",
        "SESSION_COOKIE_NAME",
        "BCRYPT_COST",
    ];
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_env: Environment::Development,
            host: "0.0.0.0".into(),
            port: 3001,
            frontend_url: "http://localhost:5173".into(),
            upload_dir: "public/uploads".into(),
            max_upload_bytes: 10 * 1024 * 1024,
            db_max_connections: 5,
            jwt_expiration_hours: 24,
            session_ttl_seconds: 60 * 60 * 24,
            session_cookie_name: "sid".into(),
            bcrypt_cost: None,
        }
    }
}

impl AppConfig {
    /// 从进程环境加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Ok(path) = env::var("APP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::raw().only(&Settings::ENV_KEYS));

        Self::from_sources(&figment, |key| env::var(key).ok())
    }

    /// 由给定的 figment 与环境变量查找函数构建配置
    pub fn from_sources<F>(figment: &Figment, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings: Settings = figment
            .extract()
            .map_err(|err| ConfigError::InvalidSettings(err.to_string()))?;

        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARIABLES
            .iter()
            .filter(|key| read(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }
        let required = |key: &str| read(key).unwrap_or_default();

        let admin = match (read("ADMIN_EMAIL"), read("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            _ => None,
        };

        let config = Self {
            environment: settings.app_env,
            server: ServerConfig {
                host: settings.host,
                port: settings.port,
                frontend_url: settings.frontend_url,
                upload_dir: settings.upload_dir,
                max_upload_bytes: settings.max_upload_bytes,
                bcrypt_cost: settings.bcrypt_cost,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL"),
                max_connections: settings.db_max_connections,
            },
            redis: RedisConfig {
                url: required("REDIS_URL"),
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET"),
                expiration_hours: settings.jwt_expiration_hours,
            },
            session: SessionConfig {
                secret: required("SESSION_SECRET"),
                ttl_seconds: settings.session_ttl_seconds,
                cookie_name: settings.session_cookie_name,
            },
            admin,
        };
        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidServerConfig(
                "port must be greater than 0".to_string(),
            ));
        }

        if self.server.frontend_url.trim().is_empty() {
            return Err(ConfigError::InvalidServerConfig(
                "frontend url cannot be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidDatabaseConfig(
                "max connections must be greater than 0".to_string(),
            ));
        }

        if self.jwt.expiration_hours <= 0 {
            return Err(ConfigError::InvalidJwtConfig(
                "expiration hours must be positive".to_string(),
            ));
        }

        if self.session.ttl_seconds == 0 {
            return Err(ConfigError::InvalidSessionConfig(
                "ttl must be greater than 0".to_string(),
            ));
        }

        // 验证bcrypt cost（如果设置）
        if let Some(cost) = self.server.bcrypt_cost {
            if !(10..=14).contains(&cost) {
                return Err(ConfigError::InvalidServerConfig(
                    "bcrypt cost should be between 10-14 for security".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// 不含密钥的配置摘要，用于启动日志
    pub fn summary(&self) -> String {
        format!(
            "env={:?} bind={}:{} frontend={} uploads={} db_pool={} jwt_ttl={}h session_ttl={}s",
            self.environment,
            self.server.host,
            self.server.port,
            self.server.frontend_url,
            self.server.upload_dir,
            self.database.max_connections,
            self.jwt.expiration_hours,
            self.session.ttl_seconds,
        )
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),
    #[error("Invalid database configuration: {0}")]
    InvalidDatabaseConfig(String),
    #[error("Invalid JWT configuration: {0}")]
    InvalidJwtConfig(String),
    #[error("Invalid session configuration: {0}")]
    InvalidSessionConfig(String),
}
