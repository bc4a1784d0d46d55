// 条件 - 一个具体的过滤项（属性 + 修饰符 + 值）
//
// 条件是不可变值：编辑总是返回新的条件，原条件保持不变。

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::criterion_option::{CriterionOption, HierarchyDirection};
use super::modifier::CriterionModifier;
use super::rating::{format_display, RatingSystem};
use super::request::CriterionInput;
use super::validation::FilterError;
use super::value::{CriterionValue, HierarchicalValue, LabeledId, NumberRange, RatingValue};

/// 过滤条件
#[derive(Debug, Clone)]
pub struct Criterion {
    option: &'static CriterionOption,
    modifier: CriterionModifier,
    value: CriterionValue,
}

impl PartialEq for Criterion {
    fn eq(&self, other: &Self) -> bool {
        self.option.criterion_type == other.option.criterion_type
            && self.modifier == other.modifier
            && self.value == other.value
    }
}

impl Eq for Criterion {}

/// 条件在 JSON 文档中的结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionDocument {
    #[serde(rename = "type")]
    pub criterion_type: String,
    pub modifier: CriterionModifier,
    pub value: CriterionValue,
}

impl Criterion {
    /// 新建条件：默认修饰符 + 空值
    pub fn new(option: &'static CriterionOption) -> Self {
        Self {
            option,
            modifier: option.default_modifier,
            value: CriterionValue::empty(option.shape),
        }
    }

    /// 同时指定修饰符与值
    pub fn build(
        option: &'static CriterionOption,
        modifier: CriterionModifier,
        value: CriterionValue,
    ) -> Result<Self, FilterError> {
        Self::new(option).with_modifier(modifier)?.with_value(value)
    }

    pub fn option(&self) -> &'static CriterionOption {
        self.option
    }

    pub fn modifier(&self) -> CriterionModifier {
        self.modifier
    }

    pub fn value(&self) -> &CriterionValue {
        &self.value
    }

    /// 去重与列表比较使用的稳定键
    pub fn id(&self) -> &'static str {
        self.option.criterion_type
    }

    pub fn with_modifier(&self, modifier: CriterionModifier) -> Result<Self, FilterError> {
        if !self.option.allows(modifier) {
            return Err(FilterError::ModifierNotAllowed {
                criterion_type: self.option.criterion_type.to_string(),
                modifier,
            });
        }
        Ok(Self {
            modifier,
            ..self.clone()
        })
    }

    pub fn with_value(&self, value: CriterionValue) -> Result<Self, FilterError> {
        if value.shape() != self.option.shape {
            return Err(FilterError::ValueShapeMismatch {
                criterion_type: self.option.criterion_type.to_string(),
                expected: self.option.shape,
                actual: value.shape(),
            });
        }
        Ok(Self {
            value,
            ..self.clone()
        })
    }

    /// 值对当前修饰符是否有效；无效条件不会被序列化
    pub fn is_valid(&self) -> bool {
        if self.modifier.is_null_check() {
            return true;
        }

        match &self.value {
            CriterionValue::String(s) => match self.modifier {
                CriterionModifier::MatchesRegex | CriterionModifier::NotMatchesRegex => {
                    !s.is_empty() && Regex::new(s).is_ok()
                }
                _ => !s.is_empty(),
            },
            CriterionValue::StringList(list) => !list.is_empty() && list.iter().all(|s| !s.is_empty()),
            CriterionValue::Range(range) => {
                bounds_valid(self.modifier, range.value.is_some(), range.value2.is_some())
            }
            CriterionValue::Rating(rating) => {
                bounds_valid(self.modifier, rating.value.is_some(), rating.value2.is_some())
            }
            CriterionValue::Hierarchical(h) => {
                !h.is_empty()
                    && h.depth >= HierarchicalValue::UNLIMITED_DEPTH
                    && h.items.iter().chain(&h.excluded).all(|i| !i.id.is_empty())
            }
            CriterionValue::Enum(v) => self.option.enum_values.iter().any(|allowed| allowed == v),
        }
    }

    /// 远程服务需要的条件结构
    pub fn to_request_fragment(&self) -> CriterionInput {
        let modifier = self.modifier;
        match &self.value {
            CriterionValue::String(value) | CriterionValue::Enum(value) => CriterionInput::String {
                value: value.clone(),
                modifier,
            },
            CriterionValue::StringList(value) => CriterionInput::MultiString {
                value: value.clone(),
                modifier,
            },
            CriterionValue::Range(NumberRange { value, value2 }) => CriterionInput::Int {
                value: *value,
                value2: *value2,
                modifier,
            },
            CriterionValue::Rating(RatingValue { value, value2 }) => CriterionInput::Int {
                value: value.map(i64::from),
                value2: value2.map(i64::from),
                modifier,
            },
            CriterionValue::Hierarchical(h) => CriterionInput::Hierarchical {
                value: h.items.iter().map(|i| i.id.clone()).collect(),
                excludes: h.excluded.iter().map(|i| i.id.clone()).collect(),
                depth: match self.option.hierarchy {
                    HierarchyDirection::Flat => 0,
                    _ => h.depth,
                },
                modifier,
            },
        }
    }

    /// 可读的标签，例如 "Tags includes all: Action, Comedy"
    pub fn label(&self, rating_system: RatingSystem) -> String {
        let name = self.option.display_name;
        let modifier = self.modifier.display_name();
        if self.modifier.is_null_check() {
            return format!("{} {}", name, modifier);
        }

        let value = self.value_label(rating_system);
        if value.is_empty() {
            format!("{} {}", name, modifier)
        } else {
            format!("{} {}: {}", name, modifier, value)
        }
    }

    fn value_label(&self, rating_system: RatingSystem) -> String {
        match &self.value {
            CriterionValue::String(s) | CriterionValue::Enum(s) => s.clone(),
            CriterionValue::StringList(list) => list.join(", "),
            CriterionValue::Range(range) => {
                let first = range.value.unwrap_or_default();
                if self.modifier.is_range() {
                    format!("{}, {}", first, range.value2.unwrap_or_default())
                } else {
                    first.to_string()
                }
            }
            CriterionValue::Rating(rating) => {
                let first = format_display(rating.value.unwrap_or_default(), rating_system);
                if self.modifier.is_range() {
                    let second = format_display(rating.value2.unwrap_or_default(), rating_system);
                    format!("{}, {}", first, second)
                } else {
                    first
                }
            }
            CriterionValue::Hierarchical(h) => self.hierarchical_label(h),
        }
    }

    fn hierarchical_label(&self, h: &HierarchicalValue) -> String {
        let names = |ids: &[LabeledId]| {
            ids.iter()
                .map(|i| if i.label.is_empty() { i.id.as_str() } else { i.label.as_str() })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut label = names(&h.items);
        if !h.excluded.is_empty() {
            if !label.is_empty() {
                label.push(' ');
            }
            label.push_str(&format!("(excludes: {})", names(&h.excluded)));
        }
        if self.option.hierarchy != HierarchyDirection::Flat {
            match h.depth {
                0 => {}
                HierarchicalValue::UNLIMITED_DEPTH => label.push_str(" (+all levels)"),
                n => label.push_str(&format!(" (+{} levels)", n)),
            }
        }
        label
    }

    /// URL 中的值：`<MODIFIER>:<payload>`
    pub fn encode_query_value(&self) -> String {
        format!("{}:{}", self.modifier.as_str(), self.value.encode_payload())
    }

    /// 解析 URL 中的值
    pub fn decode_query_value(option: &'static CriterionOption, raw: &str) -> Result<Self, FilterError> {
        let (modifier, payload) = raw
            .split_once(':')
            .ok_or_else(|| FilterError::InvalidValue(format!("missing modifier in '{}'", raw)))?;
        let modifier = modifier
            .parse::<CriterionModifier>()
            .map_err(FilterError::InvalidValue)?;
        let value = CriterionValue::decode_payload(option.shape, payload)?;
        Self::build(option, modifier, value)
    }

    pub fn to_document(&self) -> CriterionDocument {
        CriterionDocument {
            criterion_type: self.option.criterion_type.to_string(),
            modifier: self.modifier,
            value: self.value.clone(),
        }
    }

    pub fn from_document(
        option: &'static CriterionOption,
        document: CriterionDocument,
    ) -> Result<Self, FilterError> {
        Self::build(option, document.modifier, document.value)
    }
}

fn bounds_valid(modifier: CriterionModifier, has_value: bool, has_value2: bool) -> bool {
    if modifier.is_range() {
        has_value && has_value2
    } else {
        has_value
    }
}

/// 丢弃无效条件并按 id 去重（后写入者覆盖，位置保持首次出现的位置）
pub fn normalize_criteria<I>(criteria: I) -> Vec<Criterion>
where
    I: IntoIterator<Item = Criterion>,
{
    let mut normalized: Vec<Criterion> = Vec::new();
    for criterion in criteria {
        if !criterion.is_valid() {
            tracing::debug!("Dropping invalid criterion '{}'", criterion.id());
            continue;
        }
        match normalized.iter().position(|c| c.id() == criterion.id()) {
            Some(index) => normalized[index] = criterion,
            None => normalized.push(criterion),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref URL: CriterionOption = CriterionOption::string("url", "URL");
        static ref TAGS: CriterionOption = CriterionOption::hierarchical(
            "tags",
            "Tags",
            "tags",
            HierarchyDirection::Descendants,
        );
        static ref PERFORMERS: CriterionOption = CriterionOption::hierarchical(
            "performers",
            "Performers",
            "performers",
            HierarchyDirection::Flat,
        );
        static ref RATING: CriterionOption = CriterionOption::rating("rating", "Rating", "rating100");
        static ref DURATION: CriterionOption = CriterionOption::mandatory_number("duration", "Duration");
        static ref MISSING: CriterionOption =
            CriterionOption::enumeration("is_missing", "Is missing", "is_missing", vec!["title", "url"]);
    }

    fn string_criterion(value: &str) -> Criterion {
        Criterion::build(&URL, CriterionModifier::Equals, CriterionValue::String(value.to_string()))
            .unwrap()
    }

    fn tags(ids: &[&str]) -> Criterion {
        let items = ids.iter().map(|id| LabeledId::new(*id, format!("Tag {}", id))).collect();
        Criterion::build(
            &TAGS,
            CriterionModifier::IncludesAll,
            CriterionValue::Hierarchical(HierarchicalValue::new(items)),
        )
        .unwrap()
    }

    #[test]
    fn test_new_uses_default_modifier() {
        let criterion = Criterion::new(&TAGS);
        assert_eq!(criterion.modifier(), CriterionModifier::IncludesAll);
        assert_eq!(criterion.id(), "tags");
        assert!(!criterion.is_valid());
    }

    #[test]
    fn test_edit_returns_new_value() {
        let original = string_criterion("example.com");
        let edited = original.with_modifier(CriterionModifier::NotEquals).unwrap();
        assert_eq!(original.modifier(), CriterionModifier::Equals);
        assert_eq!(edited.modifier(), CriterionModifier::NotEquals);
    }

    #[test]
    fn test_disallowed_modifier_rejected() {
        let result = Criterion::new(&TAGS).with_modifier(CriterionModifier::Between);
        assert!(matches!(result, Err(FilterError::ModifierNotAllowed { .. })));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = Criterion::new(&URL).with_value(CriterionValue::Range(NumberRange::single(1)));
        assert!(matches!(result, Err(FilterError::ValueShapeMismatch { .. })));
    }

    #[test]
    fn test_validity_rules() {
        assert!(!string_criterion("").is_valid());
        assert!(string_criterion("x").is_valid());

        let null_check = Criterion::new(&RATING).with_modifier(CriterionModifier::IsNull).unwrap();
        assert!(null_check.is_valid());

        let between = Criterion::build(
            &DURATION,
            CriterionModifier::Between,
            CriterionValue::Range(NumberRange::single(10)),
        )
        .unwrap();
        assert!(!between.is_valid());
        let between = between
            .with_value(CriterionValue::Range(NumberRange::between(10, 20)))
            .unwrap();
        assert!(between.is_valid());

        let empty_range = Criterion::new(&DURATION);
        assert!(!empty_range.is_valid());

        let only_excluded = Criterion::new(&TAGS)
            .with_value(CriterionValue::Hierarchical(
                HierarchicalValue::default().with_excluded(vec![LabeledId::new("3", "")]),
            ))
            .unwrap();
        assert!(only_excluded.is_valid());

        let bad_regex = Criterion::build(
            &URL,
            CriterionModifier::MatchesRegex,
            CriterionValue::String("(".to_string()),
        )
        .unwrap();
        assert!(!bad_regex.is_valid());

        let missing = Criterion::new(&MISSING);
        assert!(!missing.is_valid());
        assert!(missing
            .with_value(CriterionValue::Enum("url".to_string()))
            .unwrap()
            .is_valid());
    }

    #[test]
    fn test_labels() {
        let criterion = Criterion::build(
            &TAGS,
            CriterionModifier::IncludesAll,
            CriterionValue::Hierarchical(HierarchicalValue::new(vec![
                LabeledId::new("1", "Action"),
                LabeledId::new("2", "Comedy"),
            ])),
        )
        .unwrap();
        assert_eq!(
            criterion.label(RatingSystem::FiveStar),
            "Tags includes all: Action, Comedy"
        );

        let rating = Criterion::build(
            &RATING,
            CriterionModifier::Between,
            CriterionValue::Rating(RatingValue::between(40, 80)),
        )
        .unwrap();
        assert_eq!(rating.label(RatingSystem::FiveStar), "Rating between: 2, 4");

        let null_check = Criterion::new(&RATING).with_modifier(CriterionModifier::IsNull).unwrap();
        assert_eq!(null_check.label(RatingSystem::FiveStar), "Rating is null");

        let deep = tags(&["1"])
            .with_value(CriterionValue::Hierarchical(
                HierarchicalValue::new(vec![LabeledId::new("1", "")]).with_depth(-1),
            ))
            .unwrap();
        assert_eq!(deep.label(RatingSystem::FiveStar), "Tags includes all: 1 (+all levels)");
    }

    #[test]
    fn test_request_fragments() {
        let rating = Criterion::build(
            &RATING,
            CriterionModifier::GreaterThan,
            CriterionValue::Rating(RatingValue::single(60)),
        )
        .unwrap();
        assert_eq!(
            rating.to_request_fragment(),
            CriterionInput::Int {
                value: Some(60),
                value2: None,
                modifier: CriterionModifier::GreaterThan,
            }
        );

        let performers = Criterion::build(
            &PERFORMERS,
            CriterionModifier::Includes,
            CriterionValue::Hierarchical(HierarchicalValue::new(vec![LabeledId::new("7", "")]).with_depth(3)),
        )
        .unwrap();
        match performers.to_request_fragment() {
            CriterionInput::Hierarchical { value, depth, .. } => {
                assert_eq!(value, vec!["7".to_string()]);
                assert_eq!(depth, 0);
            }
            other => panic!("unexpected fragment {:?}", other),
        }
    }

    #[test]
    fn test_query_value_round_trip() {
        let criterion = tags(&["1", "2"]);
        let encoded = criterion.encode_query_value();
        assert!(encoded.starts_with("INCLUDES_ALL:"));
        let decoded = Criterion::decode_query_value(&TAGS, &encoded).unwrap();
        assert_eq!(decoded, criterion);

        let url = string_criterion("http://example.com/a:b");
        let decoded = Criterion::decode_query_value(&URL, &url.encode_query_value()).unwrap();
        assert_eq!(decoded, url);

        assert!(Criterion::decode_query_value(&URL, "example.com").is_err());
        assert!(Criterion::decode_query_value(&URL, "WHATEVER:x").is_err());
        assert!(Criterion::decode_query_value(&URL, "BETWEEN:x").is_err());
    }

    #[test]
    fn test_normalize_drops_invalid_and_dedups() {
        let normalized = normalize_criteria(vec![
            tags(&["1"]),
            string_criterion(""),
            string_criterion("a.com"),
            tags(&["2", "3"]),
        ]);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0], tags(&["3", "2"]));
        assert_eq!(normalized[1], string_criterion("a.com"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_criteria(vec![
            string_criterion("a"),
            tags(&["1"]),
            string_criterion("b"),
            Criterion::new(&DURATION),
        ]);
        let twice = normalize_criteria(once.clone());
        assert_eq!(once, twice);
    }
}
