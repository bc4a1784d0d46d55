use sqlx::{sqlite::{SqlitePoolOptions, SqliteConnectOptions}, Pool, Sqlite};
use std::str::FromStr;

use crate::services::StoreError;

pub mod saved_filter_repository;
pub mod schema;

pub use saved_filter_repository::{SavedFilterService, SqliteSavedFilterRepository};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    saved_filters: SqliteSavedFilterRepository,
}

impl Database {
    /// 连接 DATABASE_URL 指定的数据库
    pub async fn new() -> Result<Self, StoreError> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./catalog_filters.db?mode=rwc".to_string());
        Self::connect(&database_url).await
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        tracing::info!("Connecting to database: {}", database_url);

        // 配置 SQLite 连接选项
        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .busy_timeout(std::time::Duration::from_secs(30));

        // SQLite 单写入者，限制为1个连接（内存数据库也依赖这一点）
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        schema::create_schema(&pool).await?;

        let saved_filters = SqliteSavedFilterRepository::new(pool.clone());
        Ok(Self { pool, saved_filters })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn saved_filters(&self) -> &SqliteSavedFilterRepository {
        &self.saved_filters
    }
}
