use sqlx::{Pool, Sqlite};

use crate::services::StoreError;

const CREATE_STATEMENTS: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS saved_filters (
        id TEXT PRIMARY KEY,
        mode TEXT NOT NULL,
        name TEXT NOT NULL,
        filter TEXT NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_saved_filters_mode ON saved_filters(mode)",
    // 每个列表类型最多一个默认过滤器
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_saved_filters_default ON saved_filters(mode) WHERE is_default = 1",
];

/// 创建保存过滤器所需的表和索引
pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<(), StoreError> {
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    verify_schema(pool).await
}

/// 验证数据库schema完整性
pub async fn verify_schema(pool: &Pool<Sqlite>) -> Result<(), StoreError> {
    let required = [
        ("table", "saved_filters"),
        ("index", "idx_saved_filters_mode"),
        ("index", "idx_saved_filters_default"),
    ];

    for (kind, name) in required {
        let exists = sqlx::query("SELECT name FROM sqlite_master WHERE type = ? AND name = ?")
            .bind(kind)
            .bind(name)
            .fetch_optional(pool)
            .await?;

        if exists.is_none() {
            return Err(StoreError::NotFound(format!("{} '{}'", kind, name)));
        }
    }

    tracing::debug!("Database schema verification completed successfully");
    Ok(())
}
