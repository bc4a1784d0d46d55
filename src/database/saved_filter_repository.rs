use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

use crate::models::{FilterMode, ListFilterModel, SavedFilter};
use crate::services::StoreError;

/// 保存的过滤器仓库接口
#[async_trait]
pub trait SavedFilterService: Send + Sync {
    /// 某个列表类型的默认过滤器
    async fn find_default(&self, mode: FilterMode) -> Result<Option<SavedFilter>, StoreError>;
    async fn find(&self, id: &str) -> Result<Option<SavedFilter>, StoreError>;
    /// 命名的过滤器（不含默认过滤器），按名称排序
    async fn list(&self, mode: FilterMode) -> Result<Vec<SavedFilter>, StoreError>;
    async fn save(&self, filter: &SavedFilter) -> Result<(), StoreError>;
    /// 替换某个列表类型的默认过滤器
    async fn set_default(&self, filter: &ListFilterModel) -> Result<SavedFilter, StoreError>;
    async fn destroy(&self, id: &str) -> Result<(), StoreError>;
}

/// SQLite 保存过滤器仓库
#[derive(Clone)]
pub struct SqliteSavedFilterRepository {
    pool: Pool<Sqlite>,
}

impl SqliteSavedFilterRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, mode, name, filter, is_default, created_at, updated_at FROM saved_filters";

fn saved_filter_from_row(row: &SqliteRow) -> Result<SavedFilter, StoreError> {
    let mode: String = row.try_get("mode")?;
    let mode = mode
        .parse::<FilterMode>()
        .map_err(|e| StoreError::Database(sqlx::Error::Decode(e.into())))?;

    Ok(SavedFilter {
        id: row.try_get("id")?,
        mode,
        name: row.try_get("name")?,
        filter: row.try_get("filter")?,
        is_default: row.try_get("is_default")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl SavedFilterService for SqliteSavedFilterRepository {
    async fn find_default(&self, mode: FilterMode) -> Result<Option<SavedFilter>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE mode = ? AND is_default = 1", SELECT_COLUMNS))
            .bind(mode.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(saved_filter_from_row).transpose()
    }

    async fn find(&self, id: &str) -> Result<Option<SavedFilter>, StoreError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(saved_filter_from_row).transpose()
    }

    async fn list(&self, mode: FilterMode) -> Result<Vec<SavedFilter>, StoreError> {
        let rows = sqlx::query(&format!(
            "{} WHERE mode = ? AND is_default = 0 ORDER BY name COLLATE NOCASE",
            SELECT_COLUMNS
        ))
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(saved_filter_from_row).collect()
    }

    async fn save(&self, filter: &SavedFilter) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO saved_filters (id, mode, name, filter, is_default, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                filter = excluded.filter,
                is_default = excluded.is_default,
                updated_at = excluded.updated_at",
        )
        .bind(&filter.id)
        .bind(filter.mode.as_str())
        .bind(&filter.name)
        .bind(&filter.filter)
        .bind(filter.is_default)
        .bind(filter.created_at)
        .bind(filter.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("保存过滤器: {} ({})", filter.name, filter.mode);
        Ok(())
    }

    async fn set_default(&self, filter: &ListFilterModel) -> Result<SavedFilter, StoreError> {
        let saved = SavedFilter::new_default(filter)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM saved_filters WHERE mode = ? AND is_default = 1")
            .bind(saved.mode.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO saved_filters (id, mode, name, filter, is_default, created_at, updated_at)
             VALUES (?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&saved.id)
        .bind(saved.mode.as_str())
        .bind(&saved.name)
        .bind(&saved.filter)
        .bind(saved.created_at)
        .bind(saved.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("更新默认过滤器: {}", saved.mode);
        Ok(saved)
    }

    async fn destroy(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM saved_filters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("saved filter {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    async fn repository() -> SqliteSavedFilterRepository {
        Database::connect("sqlite::memory:")
            .await
            .unwrap()
            .saved_filters()
            .clone()
    }

    #[tokio::test]
    async fn test_save_find_list_destroy() {
        let repo = repository().await;
        let filter = ListFilterModel::new(FilterMode::Scenes).with_search_term("beach");

        let b = SavedFilter::new("beach", &filter).unwrap();
        let a = SavedFilter::new("Alps", &filter.with_search_term("alps")).unwrap();
        repo.save(&b).await.unwrap();
        repo.save(&a).await.unwrap();

        let found = repo.find(&b.id).await.unwrap().unwrap();
        assert_eq!(found.name, "beach");
        assert_eq!(found.to_filter(&ListFilterModel::new(FilterMode::Scenes)).unwrap(), filter);

        let names: Vec<_> = repo
            .list(FilterMode::Scenes)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Alps", "beach"]);
        assert!(repo.list(FilterMode::Tags).await.unwrap().is_empty());

        let mut renamed = found.clone();
        renamed.name = "Beach".to_string();
        repo.save(&renamed).await.unwrap();
        assert_eq!(repo.find(&b.id).await.unwrap().unwrap().name, "Beach");

        repo.destroy(&b.id).await.unwrap();
        assert!(repo.find(&b.id).await.unwrap().is_none());
        assert!(matches!(repo.destroy(&b.id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_default_filter_is_replaced() {
        let repo = repository().await;
        assert!(repo.find_default(FilterMode::Tags).await.unwrap().is_none());

        let first = ListFilterModel::new(FilterMode::Tags).with_search_term("one");
        let second = ListFilterModel::new(FilterMode::Tags).with_search_term("two");
        repo.set_default(&first).await.unwrap();
        let saved = repo.set_default(&second).await.unwrap();

        let found = repo.find_default(FilterMode::Tags).await.unwrap().unwrap();
        assert_eq!(found.id, saved.id);
        assert!(found.is_default);
        assert_eq!(
            found.to_filter(&ListFilterModel::new(FilterMode::Tags)).unwrap().search_term(),
            "two"
        );
        // 默认过滤器不出现在命名列表中
        assert!(repo.list(FilterMode::Tags).await.unwrap().is_empty());
    }
}
