use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::modifier::{CriterionModifier, FilterMode, SortDirection};

/// 单个条件发给远程服务的结构
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CriterionInput {
    String {
        value: String,
        modifier: CriterionModifier,
    },
    MultiString {
        value: Vec<String>,
        modifier: CriterionModifier,
    },
    Int {
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        value2: Option<i64>,
        modifier: CriterionModifier,
    },
    Hierarchical {
        value: Vec<String>,
        excludes: Vec<String>,
        depth: i32,
        modifier: CriterionModifier,
    },
}

/// 分页、排序、搜索参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub page: u32,
    pub per_page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    pub direction: SortDirection,
    /// 随机排序种子，None 表示请服务端生成
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// 远程查询请求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindFilterRequest {
    pub mode: FilterMode,
    pub filter: FindFilter,
    /// 参数名 -> 条件
    pub object_filter: BTreeMap<String, CriterionInput>,
}

impl FindFilterRequest {
    /// 请求指纹（请求 JSON 的 SHA-256）
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: u32) -> FindFilterRequest {
        FindFilterRequest {
            mode: FilterMode::Scenes,
            filter: FindFilter {
                q: None,
                page,
                per_page: 40,
                sort: Some("date".to_string()),
                direction: SortDirection::Desc,
                seed: None,
            },
            object_filter: BTreeMap::new(),
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(request(1).fingerprint(), request(1).fingerprint());
        assert_ne!(request(1).fingerprint(), request(2).fingerprint());
        assert_eq!(request(1).fingerprint().len(), 64);
    }

    #[test]
    fn test_hierarchical_input_shape() {
        let input = CriterionInput::Hierarchical {
            value: vec!["1".to_string()],
            excludes: vec![],
            depth: -1,
            modifier: CriterionModifier::IncludesAll,
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({
                "value": ["1"],
                "excludes": [],
                "depth": -1,
                "modifier": "INCLUDES_ALL"
            })
        );
    }
}
