use sqlx::migrate::Migrator;

/// 工作区根目录下的 SQL 迁移脚本
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
