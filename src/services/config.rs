// 过滤器配置
//
// 从环境变量（以及 .env）读取列表默认值，无效值回退到默认值。

use serde::{Deserialize, Serialize};

use crate::models::{FilterDefaults, FilterMode, RatingSystem};

/// 列表过滤器的全局配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfiguration {
    /// 每页条目数
    pub items_per_page: u32,
    /// 评分显示制式
    pub rating_system: RatingSystem,
    pub default_zoom_index: u32,
    pub max_zoom_index: u32,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            items_per_page: FilterDefaults::ITEMS_PER_PAGE,
            rating_system: RatingSystem::default(),
            default_zoom_index: FilterDefaults::ZOOM_INDEX,
            max_zoom_index: FilterDefaults::MAX_ZOOM_INDEX,
        }
    }
}

impl FilterConfiguration {
    pub const ENV_ITEMS_PER_PAGE: &'static str = "CATALOG_ITEMS_PER_PAGE";
    pub const ENV_RATING_SYSTEM: &'static str = "CATALOG_RATING_SYSTEM";
    pub const ENV_DEFAULT_ZOOM: &'static str = "CATALOG_DEFAULT_ZOOM";

    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::ENV_ITEMS_PER_PAGE) {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => config.items_per_page = n,
                _ => tracing::warn!("{} 无效: {}，使用默认值", Self::ENV_ITEMS_PER_PAGE, raw),
            }
        }

        if let Some(raw) = lookup(Self::ENV_RATING_SYSTEM) {
            match raw.trim().parse::<RatingSystem>() {
                Ok(system) => config.rating_system = system,
                Err(e) => tracing::warn!("{}，使用默认值", e),
            }
        }

        if let Some(raw) = lookup(Self::ENV_DEFAULT_ZOOM) {
            match raw.trim().parse::<u32>() {
                Ok(z) if z <= config.max_zoom_index => config.default_zoom_index = z,
                _ => tracing::warn!("{} 无效: {}，使用默认值", Self::ENV_DEFAULT_ZOOM, raw),
            }
        }

        config
    }

    /// 某个列表类型的过滤器默认值
    pub fn filter_defaults(&self, mode: FilterMode) -> FilterDefaults {
        FilterDefaults {
            items_per_page: self.items_per_page,
            zoom_index: self.default_zoom_index,
            max_zoom_index: self.max_zoom_index,
            ..FilterDefaults::for_mode(mode)
        }
    }
}
