// 条件值
//
// 每种值形态对应一个变体，序列化、校验处都要求穷尽匹配。
// URL 载荷编码：
// - 字符串：原样
// - 字符串列表：a|b|c
// - 数值范围 / 评分：value,value2（任一侧可为空）
// - 层级 ID 集合：id=label|id=label;excluded:id=label;depth:N
// - 枚举：原样
// 每个分量都经过 urlencoding 编码，分隔符不会出现在分量内部。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::criterion_option::ValueShape;
use super::validation::FilterError;

/// 数值范围
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<i64>,
}

impl NumberRange {
    pub fn single(value: i64) -> Self {
        Self { value: Some(value), value2: None }
    }

    pub fn between(value: i64, value2: i64) -> Self {
        Self { value: Some(value), value2: Some(value2) }
    }
}

/// 评分值，内部 0-100 刻度
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<i32>,
}

impl RatingValue {
    pub fn single(value: i32) -> Self {
        Self { value: Some(value), value2: None }
    }

    pub fn between(value: i32, value2: i32) -> Self {
        Self { value: Some(value), value2: Some(value2) }
    }
}

/// 带显示名称的实体 ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledId {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl LabeledId {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// 层级 ID 集合
///
/// `depth = 0` 仅精确匹配，正数表示包含的层级数，`-1` 表示不限层级。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchicalValue {
    #[serde(default)]
    pub items: Vec<LabeledId>,
    #[serde(default)]
    pub excluded: Vec<LabeledId>,
    #[serde(default)]
    pub depth: i32,
}

impl HierarchicalValue {
    pub const UNLIMITED_DEPTH: i32 = -1;

    pub fn new(items: Vec<LabeledId>) -> Self {
        Self {
            items,
            excluded: Vec::new(),
            depth: 0,
        }
    }

    pub fn with_excluded(mut self, excluded: Vec<LabeledId>) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn item_ids(&self) -> BTreeSet<&str> {
        self.items.iter().map(|i| i.id.as_str()).collect()
    }

    pub fn excluded_ids(&self) -> BTreeSet<&str> {
        self.excluded.iter().map(|i| i.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.excluded.is_empty()
    }
}

// 比较 ID 集合与深度，不考虑顺序和显示名称
impl PartialEq for HierarchicalValue {
    fn eq(&self, other: &Self) -> bool {
        self.depth == other.depth
            && self.item_ids() == other.item_ids()
            && self.excluded_ids() == other.excluded_ids()
    }
}

impl Eq for HierarchicalValue {}

/// 条件值（按值形态区分）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionValue {
    String(String),
    StringList(Vec<String>),
    Range(NumberRange),
    Hierarchical(HierarchicalValue),
    Rating(RatingValue),
    Enum(String),
}

impl CriterionValue {
    /// 某种形态的初始值
    pub fn empty(shape: ValueShape) -> Self {
        match shape {
            ValueShape::String => CriterionValue::String(String::new()),
            ValueShape::StringList => CriterionValue::StringList(Vec::new()),
            ValueShape::Range => CriterionValue::Range(NumberRange::default()),
            ValueShape::Hierarchical => CriterionValue::Hierarchical(HierarchicalValue::default()),
            ValueShape::Rating => CriterionValue::Rating(RatingValue::default()),
            ValueShape::Enum => CriterionValue::Enum(String::new()),
        }
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            CriterionValue::String(_) => ValueShape::String,
            CriterionValue::StringList(_) => ValueShape::StringList,
            CriterionValue::Range(_) => ValueShape::Range,
            CriterionValue::Hierarchical(_) => ValueShape::Hierarchical,
            CriterionValue::Rating(_) => ValueShape::Rating,
            CriterionValue::Enum(_) => ValueShape::Enum,
        }
    }

    /// 编码为 URL 载荷
    pub fn encode_payload(&self) -> String {
        match self {
            CriterionValue::String(s) | CriterionValue::Enum(s) => s.clone(),
            CriterionValue::StringList(list) => list
                .iter()
                .map(|s| urlencoding::encode(s).into_owned())
                .collect::<Vec<_>>()
                .join("|"),
            CriterionValue::Range(range) => encode_bounds(range.value, range.value2),
            CriterionValue::Rating(rating) => encode_bounds(rating.value, rating.value2),
            CriterionValue::Hierarchical(h) => {
                let mut segments = vec![encode_labeled_ids(&h.items)];
                if !h.excluded.is_empty() {
                    segments.push(format!("excluded:{}", encode_labeled_ids(&h.excluded)));
                }
                segments.push(format!("depth:{}", h.depth));
                segments.join(";")
            }
        }
    }

    /// 从 URL 载荷解码
    pub fn decode_payload(shape: ValueShape, payload: &str) -> Result<Self, FilterError> {
        let value = match shape {
            ValueShape::String => CriterionValue::String(payload.to_string()),
            ValueShape::Enum => CriterionValue::Enum(payload.to_string()),
            ValueShape::StringList => {
                let list = if payload.is_empty() {
                    Vec::new()
                } else {
                    payload
                        .split('|')
                        .map(decode_component)
                        .collect::<Result<Vec<_>, _>>()?
                };
                CriterionValue::StringList(list)
            }
            ValueShape::Range => {
                let (value, value2) = decode_bounds::<i64>(payload)?;
                CriterionValue::Range(NumberRange { value, value2 })
            }
            ValueShape::Rating => {
                let (value, value2) = decode_bounds::<i32>(payload)?;
                CriterionValue::Rating(RatingValue { value, value2 })
            }
            ValueShape::Hierarchical => CriterionValue::Hierarchical(decode_hierarchical(payload)?),
        };
        Ok(value)
    }
}

fn encode_bounds<T: ToString>(value: Option<T>, value2: Option<T>) -> String {
    let first = value.map(|v| v.to_string()).unwrap_or_default();
    match value2 {
        Some(second) => format!("{},{}", first, second.to_string()),
        None => first,
    }
}

fn decode_bounds<T: std::str::FromStr>(payload: &str) -> Result<(Option<T>, Option<T>), FilterError> {
    let parse = |part: &str| -> Result<Option<T>, FilterError> {
        let part = part.trim();
        if part.is_empty() {
            return Ok(None);
        }
        part.parse::<T>()
            .map(Some)
            .map_err(|_| FilterError::InvalidValue(format!("not a number: {}", part)))
    };

    match payload.split_once(',') {
        Some((first, second)) => Ok((parse(first)?, parse(second)?)),
        None => Ok((parse(payload)?, None)),
    }
}

fn encode_labeled_ids(ids: &[LabeledId]) -> String {
    ids.iter()
        .map(|item| {
            if item.label.is_empty() {
                urlencoding::encode(&item.id).into_owned()
            } else {
                format!(
                    "{}={}",
                    urlencoding::encode(&item.id),
                    urlencoding::encode(&item.label)
                )
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn decode_component(part: &str) -> Result<String, FilterError> {
    urlencoding::decode(part)
        .map(|s| s.into_owned())
        .map_err(|e| FilterError::InvalidValue(format!("bad encoding in {}: {}", part, e)))
}

fn decode_labeled_ids(segment: &str) -> Result<Vec<LabeledId>, FilterError> {
    if segment.is_empty() {
        return Ok(Vec::new());
    }
    segment
        .split('|')
        .map(|part| {
            let (id, label) = part.split_once('=').unwrap_or((part, ""));
            let id = decode_component(id)?;
            if id.is_empty() {
                return Err(FilterError::InvalidValue("empty id".to_string()));
            }
            Ok(LabeledId::new(id, decode_component(label)?))
        })
        .collect()
}

fn decode_hierarchical(payload: &str) -> Result<HierarchicalValue, FilterError> {
    let mut segments = payload.split(';');
    let items = decode_labeled_ids(segments.next().unwrap_or_default())?;
    let mut value = HierarchicalValue::new(items);

    for segment in segments {
        if let Some(rest) = segment.strip_prefix("excluded:") {
            value.excluded = decode_labeled_ids(rest)?;
        } else if let Some(rest) = segment.strip_prefix("depth:") {
            value.depth = rest
                .parse::<i32>()
                .ok()
                .filter(|d| *d >= HierarchicalValue::UNLIMITED_DEPTH)
                .ok_or_else(|| FilterError::InvalidValue(format!("invalid depth: {}", rest)))?;
        } else {
            return Err(FilterError::InvalidValue(format!("unknown segment: {}", segment)));
        }
    }

    Ok(value)
}
