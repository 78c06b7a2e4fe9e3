use sqlx::migrate::Migrator;

/// 工作区根目录下的 `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
