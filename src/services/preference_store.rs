// 界面偏好存储
//
// 按视图键保存列表的界面偏好（显示模式、每页条目数、侧边栏状态）。
// 读写都是简单的 get/set，同一个键后写入者覆盖。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use super::error::StoreError;

/// 单个视图的界面偏好
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewPreferences {
    /// 过滤器查询字符串（目前只包含显示模式）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub sidebar_collapsed: bool,
}

/// 偏好存储接口
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<ViewPreferences>, StoreError>;

    async fn set(&self, key: &str, preferences: ViewPreferences) -> Result<(), StoreError>;
}

/// 内存偏好存储
#[derive(Default, Clone)]
pub struct MemoryPreferenceStore {
    entries: Arc<RwLock<HashMap<String, ViewPreferences>>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<ViewPreferences>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, preferences: ViewPreferences) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), preferences);
        Ok(())
    }
}

/// JSON 文件偏好存储
///
/// 整个文件是 `视图键 -> 偏好` 的映射，每次写入后整体保存。
pub struct JsonPreferenceStore {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, ViewPreferences>>>,
}

impl JsonPreferenceStore {
    /// 默认偏好文件路径
    pub const DEFAULT_PATH: &'static str = "interface_preferences.json";

    /// 从 CATALOG_PREFERENCES_PATH 指定的文件加载
    pub async fn from_env() -> Result<Self, StoreError> {
        let path = std::env::var("CATALOG_PREFERENCES_PATH").ok().map(PathBuf::from);
        Self::load(path).await
    }

    /// 加载偏好文件
    ///
    /// # 行为
    /// - 文件不存在时使用空映射
    /// - 文件损坏时备份旧文件并使用空映射
    pub async fn load(path: Option<PathBuf>) -> Result<Self, StoreError> {
        let path = path.unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH));

        let entries = if path.exists() {
            match fs::read_to_string(&path).await {
                Ok(content) => match serde_json::from_str::<HashMap<String, ViewPreferences>>(&content) {
                    Ok(entries) => {
                        tracing::info!("成功加载界面偏好: {:?} ({} 个视图)", path, entries.len());
                        entries
                    }
                    Err(e) => {
                        tracing::warn!("偏好文件损坏，使用空偏好: {}", e);
                        Self::backup_corrupted(&path).await;
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("读取偏好文件失败，使用空偏好: {}", e);
                    HashMap::new()
                }
            }
        } else {
            tracing::info!("偏好文件不存在，使用空偏好");
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn save(&self) -> Result<(), StoreError> {
        let entries = self.entries.read().await;
        let json = serde_json::to_string_pretty(&*entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&self.path, json).await?;
        tracing::debug!("已保存界面偏好: {:?}", self.path);
        Ok(())
    }

    async fn backup_corrupted(path: &Path) {
        let backup_path = path.with_extension("json.backup");
        match fs::rename(path, &backup_path).await {
            Ok(_) => tracing::info!("已备份损坏的偏好文件到: {:?}", backup_path),
            // 备份失败不影响加载
            Err(e) => tracing::warn!("备份偏好文件失败: {}", e),
        }
    }
}

#[async_trait]
impl PreferenceStore for JsonPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<ViewPreferences>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, preferences: ViewPreferences) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), preferences);

        // 释放写锁
        drop(entries);

        self.save().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_path() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prefs").join("interface.json");
        (temp_dir, path)
    }

    fn preferences() -> ViewPreferences {
        ViewPreferences {
            filter: Some("disp=2".to_string()),
            items_per_page: Some(60),
            current_page: None,
            sidebar_collapsed: true,
        }
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("scenes").await.unwrap(), None);
        store.set("scenes", preferences()).await.unwrap();
        assert_eq!(store.get("scenes").await.unwrap(), Some(preferences()));
    }

    #[tokio::test]
    async fn test_json_store_persists() {
        let (_temp_dir, path) = temp_path();
        {
            let store = JsonPreferenceStore::load(Some(path.clone())).await.unwrap();
            store.set("scenes", preferences()).await.unwrap();
        }
        assert!(path.exists());

        let reloaded = JsonPreferenceStore::load(Some(path)).await.unwrap();
        assert_eq!(reloaded.get("scenes").await.unwrap(), Some(preferences()));
        assert_eq!(reloaded.get("tags").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_store_corrupted_file() {
        let (_temp_dir, path) = temp_path();
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, "{ not json").await.unwrap();

        let store = JsonPreferenceStore::load(Some(path.clone())).await.unwrap();
        assert_eq!(store.get("scenes").await.unwrap(), None);
        assert!(path.with_extension("json.backup").exists());
    }
}
