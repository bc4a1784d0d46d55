use serde::{Deserialize, Serialize};

use crate::models::{DisplayMode, ListFilterModel};
use crate::services::preference_store::ViewPreferences;

/// 列表状态的持久化级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistenceLevel {
    /// 不持久化
    #[default]
    None,
    /// 使用服务器上保存的默认过滤器
    All,
    /// 只持久化视图相关的设置（显示模式等）
    View,
}

/// 写入偏好存储的视图设置
pub fn view_preferences(
    filter: &ListFilterModel,
    sidebar_collapsed: bool,
) -> ViewPreferences {
    // 只保留显示模式，条件不随视图保存
    let display_only = filter.empty().with_display_mode(filter.display_mode());
    ViewPreferences {
        filter: Some(display_only.make_query_parameters()),
        items_per_page: Some(filter.items_per_page()),
        current_page: Some(filter.current_page()),
        sidebar_collapsed,
    }
}

/// 从保存的偏好中取出显示模式
pub fn stored_display_mode(base: &ListFilterModel, preferences: &ViewPreferences) -> Option<DisplayMode> {
    let query = preferences.filter.as_deref()?;
    Some(base.configure_from_query_string(query).display_mode())
}
