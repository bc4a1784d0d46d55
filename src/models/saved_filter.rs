use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::filter::ListFilterModel;
use super::modifier::FilterMode;
use super::validation::FilterError;

/// 保存的过滤器（命名预设或某个列表类型的默认过滤器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub id: String,
    pub mode: FilterMode,
    pub name: String,
    /// ListFilterModel::to_json 的结果
    pub filter: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavedFilter {
    pub fn new(name: impl Into<String>, filter: &ListFilterModel) -> Result<Self, FilterError> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            mode: filter.mode(),
            name: name.into(),
            filter: filter.to_json()?,
            is_default: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// 默认过滤器没有名称
    pub fn new_default(filter: &ListFilterModel) -> Result<Self, FilterError> {
        let mut saved = Self::new("", filter)?;
        saved.is_default = true;
        Ok(saved)
    }

    /// 以 base 的默认值解析保存的过滤器
    pub fn to_filter(&self, base: &ListFilterModel) -> Result<ListFilterModel, FilterError> {
        base.configure_from_json(&self.filter)
    }
}
