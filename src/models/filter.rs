// 列表过滤器
//
// ListFilterModel 是不可变值：所有修改方法返回新的过滤器。
// 负责 URL 查询字符串与 JSON 文档两种序列化形式。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::form_urlencoded;

use super::criterion::{normalize_criteria, Criterion, CriterionDocument};
use super::criterion_option::CriterionOption;
use super::filter_options::{filter_options, ListFilterOptions, RANDOM_SORT};
use super::modifier::{DisplayMode, FilterMode, SortDirection};
use super::rating::RatingSystem;
use super::request::{FindFilter, FindFilterRequest};
use super::validation::FilterError;

/// 请服务端生成新种子
pub const NO_RANDOM_SEED: i64 = -1;

const KEY_SEARCH: &str = "q";
const KEY_SORT_BY: &str = "sortby";
const KEY_SORT_DIR: &str = "sortdir";
const KEY_DISPLAY: &str = "disp";
const KEY_PER_PAGE: &str = "perPage";
const KEY_PAGE: &str = "page";
const KEY_ZOOM: &str = "z";
const KEY_RANDOM: &str = "random";

/// 过滤器默认值，序列化时等于默认值的字段被省略
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDefaults {
    pub items_per_page: u32,
    pub zoom_index: u32,
    pub max_zoom_index: u32,
    pub sort_by: String,
    pub sort_direction: SortDirection,
    pub display_mode: DisplayMode,
}

impl FilterDefaults {
    pub const ITEMS_PER_PAGE: u32 = 40;
    pub const ZOOM_INDEX: u32 = 1;
    pub const MAX_ZOOM_INDEX: u32 = 3;

    pub fn for_mode(mode: FilterMode) -> Self {
        let options = filter_options(mode);
        Self {
            items_per_page: Self::ITEMS_PER_PAGE,
            zoom_index: Self::ZOOM_INDEX,
            max_zoom_index: Self::MAX_ZOOM_INDEX,
            sort_by: options.default_sort_by.to_string(),
            sort_direction: SortDirection::Asc,
            display_mode: options.default_display_mode(),
        }
    }
}

/// 列表过滤器
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilterModel {
    mode: FilterMode,
    defaults: FilterDefaults,
    search_term: String,
    sort_by: String,
    sort_direction: SortDirection,
    current_page: u32,
    items_per_page: u32,
    display_mode: DisplayMode,
    zoom_index: u32,
    random_seed: i64,
    criteria: Vec<Criterion>,
}

/// 过滤器的 JSON 文档结构（保存的过滤器、默认过滤器）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFilterDocument {
    pub mode: FilterMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortby: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortdir: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disp: Option<DisplayMode>,
    #[serde(default, rename = "perPage", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random: Option<i64>,
    #[serde(default)]
    pub c: Vec<CriterionDocument>,
}

impl ListFilterModel {
    /// 某个列表类型的空过滤器
    pub fn new(mode: FilterMode) -> Self {
        Self::with_defaults(mode, FilterDefaults::for_mode(mode))
    }

    pub fn with_defaults(mode: FilterMode, defaults: FilterDefaults) -> Self {
        Self {
            mode,
            search_term: String::new(),
            sort_by: defaults.sort_by.clone(),
            sort_direction: defaults.sort_direction,
            current_page: 1,
            items_per_page: defaults.items_per_page.max(1),
            display_mode: defaults.display_mode,
            zoom_index: defaults.zoom_index.min(defaults.max_zoom_index),
            random_seed: NO_RANDOM_SEED,
            criteria: Vec::new(),
            defaults,
        }
    }

    /// 同类型、同默认值的空过滤器
    pub fn empty(&self) -> Self {
        Self::with_defaults(self.mode, self.defaults.clone())
    }

    pub fn options(&self) -> &'static ListFilterOptions {
        filter_options(self.mode)
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn zoom_index(&self) -> u32 {
        self.zoom_index
    }

    pub fn random_seed(&self) -> i64 {
        self.random_seed
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn criterion(&self, criterion_type: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id() == criterion_type)
    }

    pub fn is_random_sort(&self) -> bool {
        self.sort_by == RANDOM_SORT
    }

    /// 逐字段相同，条件按文档比较（层级值的标签也参与比较）
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other && same_documents(&self.criteria, &other.criteria)
    }

    /// 搜索词变化会改变结果集合，回到第一页并重新随机
    pub fn with_search_term(&self, term: impl Into<String>) -> Self {
        let term = term.into();
        if term == self.search_term {
            return self.clone();
        }
        Self {
            search_term: term,
            current_page: 1,
            random_seed: NO_RANDOM_SEED,
            ..self.clone()
        }
    }

    /// 不支持的排序键被忽略
    pub fn with_sort_by(&self, sort_by: &str) -> Self {
        if !self.options().supports_sort(sort_by) {
            tracing::warn!("Ignoring unsupported sort '{}' for mode {}", sort_by, self.mode);
            return self.clone();
        }
        if sort_by == self.sort_by {
            return self.clone();
        }
        Self {
            sort_by: sort_by.to_string(),
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn with_sort_direction(&self, direction: SortDirection) -> Self {
        if direction == self.sort_direction {
            return self.clone();
        }
        Self {
            sort_direction: direction,
            current_page: 1,
            ..self.clone()
        }
    }

    pub fn with_current_page(&self, page: u32) -> Self {
        Self {
            current_page: page.max(1),
            ..self.clone()
        }
    }

    pub fn with_items_per_page(&self, items_per_page: u32) -> Self {
        let items_per_page = items_per_page.max(1);
        if items_per_page == self.items_per_page {
            return self.clone();
        }
        Self {
            items_per_page,
            current_page: 1,
            ..self.clone()
        }
    }

    /// 当前列表类型不支持的显示模式被忽略
    pub fn with_display_mode(&self, display_mode: DisplayMode) -> Self {
        if !self.options().supports_display_mode(display_mode) {
            tracing::warn!("Ignoring unsupported display mode {:?} for mode {}", display_mode, self.mode);
            return self.clone();
        }
        Self {
            display_mode,
            ..self.clone()
        }
    }

    pub fn with_zoom_index(&self, zoom_index: u32) -> Self {
        Self {
            zoom_index: zoom_index.min(self.defaults.max_zoom_index),
            ..self.clone()
        }
    }

    pub fn with_random_seed(&self, random_seed: i64) -> Self {
        Self {
            random_seed,
            ..self.clone()
        }
    }

    /// 重新随机：回到第一页，请求新种子
    pub fn reshuffle(&self) -> Self {
        Self {
            current_page: 1,
            random_seed: NO_RANDOM_SEED,
            ..self.clone()
        }
    }

    /// 为某个类型新建条件；类型必须在当前列表类型中注册
    pub fn make_criterion(&self, criterion_type: &str) -> Result<Criterion, FilterError> {
        self.lookup_option(criterion_type).map(Criterion::new)
    }

    fn lookup_option(&self, criterion_type: &str) -> Result<&'static CriterionOption, FilterError> {
        self.options()
            .find(criterion_type)
            .ok_or_else(|| FilterError::UnknownCriterionType {
                mode: self.mode,
                criterion_type: criterion_type.to_string(),
            })
    }

    fn ensure_registered(&self, criterion: &Criterion) -> Result<(), FilterError> {
        let option = self.lookup_option(criterion.id())?;
        if !std::ptr::eq(option, criterion.option()) {
            return Err(FilterError::UnknownCriterionType {
                mode: self.mode,
                criterion_type: criterion.id().to_string(),
            });
        }
        Ok(())
    }

    /// 条件变化时回到第一页并重新随机；没有变化时原样返回
    fn with_normalized_criteria(&self, criteria: Vec<Criterion>) -> Self {
        let criteria = normalize_criteria(criteria);
        if same_documents(&criteria, &self.criteria) {
            return self.clone();
        }
        Self {
            criteria,
            current_page: 1,
            random_seed: NO_RANDOM_SEED,
            ..self.clone()
        }
    }

    /// 替换整个条件列表（规范化：丢弃无效条件，同 id 后者覆盖）
    pub fn set_criteria<I>(&self, criteria: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = Criterion>,
    {
        let criteria: Vec<Criterion> = criteria.into_iter().collect();
        for criterion in &criteria {
            self.ensure_registered(criterion)?;
        }
        Ok(self.with_normalized_criteria(criteria))
    }

    /// 添加或替换同类型条件
    pub fn upsert_criterion(&self, criterion: Criterion) -> Result<Self, FilterError> {
        self.ensure_registered(&criterion)?;
        let mut criteria = self.criteria.clone();
        criteria.push(criterion);
        Ok(self.with_normalized_criteria(criteria))
    }

    pub fn remove_criterion(&self, criterion_type: &str) -> Self {
        let criteria = self
            .criteria
            .iter()
            .filter(|c| c.id() != criterion_type)
            .cloned()
            .collect();
        self.with_normalized_criteria(criteria)
    }

    pub fn clear_criteria(&self) -> Self {
        self.with_normalized_criteria(Vec::new())
    }

    pub fn criterion_labels(&self, rating_system: RatingSystem) -> Vec<String> {
        self.criteria.iter().map(|c| c.label(rating_system)).collect()
    }

    /// 序列化为 URL 查询字符串（不含前导 `?`），默认值省略
    pub fn make_query_parameters(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if !self.search_term.is_empty() {
            serializer.append_pair(KEY_SEARCH, &self.search_term);
        }
        if self.sort_by != self.defaults.sort_by {
            serializer.append_pair(KEY_SORT_BY, &self.sort_by);
        }
        if self.sort_direction != self.defaults.sort_direction {
            serializer.append_pair(KEY_SORT_DIR, self.sort_direction.as_str());
        }
        if self.display_mode != self.defaults.display_mode {
            serializer.append_pair(KEY_DISPLAY, &self.display_mode.code().to_string());
        }
        if self.items_per_page != self.defaults.items_per_page {
            serializer.append_pair(KEY_PER_PAGE, &self.items_per_page.to_string());
        }
        if self.current_page != 1 {
            serializer.append_pair(KEY_PAGE, &self.current_page.to_string());
        }
        if self.zoom_index != self.defaults.zoom_index {
            serializer.append_pair(KEY_ZOOM, &self.zoom_index.to_string());
        }
        if self.random_seed != NO_RANDOM_SEED {
            serializer.append_pair(KEY_RANDOM, &self.random_seed.to_string());
        }
        for criterion in self.criteria.iter().filter(|c| c.is_valid()) {
            serializer.append_pair(criterion.option().parameter_name, &criterion.encode_query_value());
        }
        serializer.finish()
    }

    /// 从 URL 查询字符串构造过滤器
    ///
    /// 以同类型空过滤器为起点：未知键忽略，格式错误的标量字段取默认值，
    /// 格式错误的条件被跳过，重复的条件键以最后一个为准。
    pub fn configure_from_query_string(&self, query: &str) -> Self {
        let mut filter = self.empty();
        let options = self.options();
        let mut criteria = Vec::new();

        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                KEY_SEARCH => filter.search_term = value.into_owned(),
                KEY_SORT_BY => {
                    filter.sort_by = if options.supports_sort(&value) {
                        value.into_owned()
                    } else {
                        skip_field(&key, &value);
                        self.defaults.sort_by.clone()
                    }
                }
                KEY_SORT_DIR => {
                    filter.sort_direction = value.parse().unwrap_or_else(|_| {
                        skip_field(&key, &value);
                        self.defaults.sort_direction
                    })
                }
                KEY_DISPLAY => {
                    filter.display_mode = value
                        .parse::<u8>()
                        .ok()
                        .and_then(|code| DisplayMode::try_from(code).ok())
                        .filter(|mode| options.supports_display_mode(*mode))
                        .unwrap_or_else(|| {
                            skip_field(&key, &value);
                            self.defaults.display_mode
                        })
                }
                KEY_PER_PAGE => {
                    filter.items_per_page = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .unwrap_or_else(|| {
                            skip_field(&key, &value);
                            self.defaults.items_per_page
                        })
                }
                KEY_PAGE => {
                    filter.current_page = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .unwrap_or_else(|| {
                            skip_field(&key, &value);
                            1
                        })
                }
                KEY_ZOOM => {
                    filter.zoom_index = value
                        .parse::<u32>()
                        .ok()
                        .filter(|z| *z <= self.defaults.max_zoom_index)
                        .unwrap_or_else(|| {
                            skip_field(&key, &value);
                            self.defaults.zoom_index
                        })
                }
                KEY_RANDOM => {
                    filter.random_seed = value.parse::<i64>().unwrap_or_else(|_| {
                        skip_field(&key, &value);
                        NO_RANDOM_SEED
                    })
                }
                parameter => match options.find_by_parameter(parameter) {
                    Some(option) => match Criterion::decode_query_value(option, &value) {
                        Ok(criterion) => criteria.push(criterion),
                        Err(e) => tracing::debug!("Skipping criterion '{}': {}", parameter, e),
                    },
                    None => tracing::debug!("Ignoring unknown query key '{}'", parameter),
                },
            }
        }

        filter.criteria = normalize_criteria(criteria);
        filter
    }

    pub fn from_query_string(mode: FilterMode, defaults: FilterDefaults, query: &str) -> Self {
        Self::with_defaults(mode, defaults).configure_from_query_string(query)
    }

    pub fn to_document(&self) -> ListFilterDocument {
        ListFilterDocument {
            mode: self.mode,
            q: Some(self.search_term.clone()).filter(|q| !q.is_empty()),
            sortby: Some(self.sort_by.clone()),
            sortdir: Some(self.sort_direction),
            disp: Some(self.display_mode),
            per_page: Some(self.items_per_page),
            page: Some(self.current_page),
            z: Some(self.zoom_index),
            random: Some(self.random_seed),
            c: self
                .criteria
                .iter()
                .filter(|c| c.is_valid())
                .map(Criterion::to_document)
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, FilterError> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    /// 从文档构造过滤器；缺少的字段取默认值
    ///
    /// 与查询字符串不同，文档中的任何错误都会导致整个文档无效。
    pub fn configure_from_document(&self, document: ListFilterDocument) -> Result<Self, FilterError> {
        if document.mode != self.mode {
            return Err(FilterError::ModeMismatch {
                expected: self.mode,
                actual: document.mode,
            });
        }

        let mut filter = self.empty();
        if let Some(q) = document.q {
            filter.search_term = q;
        }
        if let Some(sort_by) = document.sortby {
            if !self.options().supports_sort(&sort_by) {
                return Err(FilterError::InvalidValue(format!("unsupported sort '{}'", sort_by)));
            }
            filter.sort_by = sort_by;
        }
        if let Some(direction) = document.sortdir {
            filter.sort_direction = direction;
        }
        if let Some(display_mode) = document.disp {
            if !self.options().supports_display_mode(display_mode) {
                return Err(FilterError::InvalidValue(format!(
                    "unsupported display mode {:?}",
                    display_mode
                )));
            }
            filter.display_mode = display_mode;
        }
        if let Some(per_page) = document.per_page {
            filter.items_per_page = per_page.max(1);
        }
        if let Some(page) = document.page {
            filter.current_page = page.max(1);
        }
        if let Some(z) = document.z {
            filter.zoom_index = z.min(self.defaults.max_zoom_index);
        }
        if let Some(seed) = document.random {
            filter.random_seed = seed;
        }

        let criteria = document
            .c
            .into_iter()
            .map(|doc| {
                let option = self.lookup_option(&doc.criterion_type)?;
                Criterion::from_document(option, doc)
            })
            .collect::<Result<Vec<_>, _>>()?;
        filter.criteria = normalize_criteria(criteria);

        Ok(filter)
    }

    pub fn configure_from_json(&self, json: &str) -> Result<Self, FilterError> {
        let document: ListFilterDocument = serde_json::from_str(json)?;
        self.configure_from_document(document)
    }

    /// 构造远程查询请求
    pub fn make_request(&self) -> FindFilterRequest {
        let object_filter: BTreeMap<String, _> = self
            .criteria
            .iter()
            .filter(|c| c.is_valid())
            .map(|c| (c.option().parameter_name.to_string(), c.to_request_fragment()))
            .collect();

        FindFilterRequest {
            mode: self.mode,
            filter: FindFilter {
                q: Some(self.search_term.clone()).filter(|q| !q.is_empty()),
                page: self.current_page,
                per_page: self.items_per_page,
                sort: Some(self.sort_by.clone()),
                direction: self.sort_direction,
                seed: if self.is_random_sort() && self.random_seed != NO_RANDOM_SEED {
                    Some(self.random_seed)
                } else {
                    None
                },
            },
            object_filter,
        }
    }
}

fn skip_field(key: &str, value: &str) {
    tracing::debug!("Malformed query field {}={}, using default", key, value);
}

/// 条件列表按文档逐项比较；与去重用的相等不同，标签变化也算变化
fn same_documents(a: &[Criterion], b: &[Criterion]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| x.to_document() == y.to_document())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::modifier::CriterionModifier;
    use crate::models::request::CriterionInput;
    use crate::models::value::{CriterionValue, HierarchicalValue, LabeledId, NumberRange, RatingValue};
    use proptest::prelude::*;

    fn scenes() -> ListFilterModel {
        ListFilterModel::new(FilterMode::Scenes)
    }

    fn criterion(filter: &ListFilterModel, t: &str, modifier: CriterionModifier, value: CriterionValue) -> Criterion {
        filter
            .make_criterion(t)
            .unwrap()
            .with_modifier(modifier)
            .unwrap()
            .with_value(value)
            .unwrap()
    }

    fn url(filter: &ListFilterModel, value: &str) -> Criterion {
        criterion(filter, "url", CriterionModifier::Equals, CriterionValue::String(value.to_string()))
    }

    fn tags(filter: &ListFilterModel, ids: &[&str], depth: i32) -> Criterion {
        let items = ids.iter().map(|id| LabeledId::new(*id, "")).collect();
        criterion(
            filter,
            "tags",
            CriterionModifier::IncludesAll,
            CriterionValue::Hierarchical(HierarchicalValue::new(items).with_depth(depth)),
        )
    }

    #[test]
    fn test_empty_filter_has_empty_query() {
        let filter = scenes();
        assert_eq!(filter.make_query_parameters(), "");
        assert_eq!(filter.current_page(), 1);
        assert_eq!(filter.random_seed(), NO_RANDOM_SEED);
        assert_eq!(filter.sort_by(), "date");
    }

    #[test]
    fn test_add_and_remove_criterion() {
        let filter = scenes().with_current_page(3);
        let added = filter.upsert_criterion(url(&filter, "example.com")).unwrap();
        assert!(added.make_query_parameters().contains("url="));
        assert_eq!(added.current_page(), 1);

        let paged = added.with_current_page(4);
        let removed = paged.remove_criterion("url");
        assert!(!removed.make_query_parameters().contains("url"));
        assert_eq!(removed.current_page(), 1);
        // 原过滤器不变
        assert_eq!(paged.current_page(), 4);
        assert!(paged.criterion("url").is_some());
    }

    #[test]
    fn test_label_only_edit_is_applied() {
        let filter = scenes();
        let labelled = |label: &str| {
            criterion(
                &filter,
                "tags",
                CriterionModifier::Includes,
                CriterionValue::Hierarchical(HierarchicalValue::new(vec![LabeledId::new("1", label)])),
            )
        };

        let old = filter.upsert_criterion(labelled("Old")).unwrap().with_current_page(2);
        let renamed = old.upsert_criterion(labelled("New")).unwrap();

        assert!(!renamed.is_identical(&old));
        assert_eq!(renamed.current_page(), 1);
        assert_eq!(renamed.criterion_labels(RatingSystem::default()), vec!["Tags includes: New"]);
        assert!(renamed.make_query_parameters().contains("New"));
        assert!(!renamed.make_query_parameters().contains("Old"));

        // 完全相同的条件不算变化
        let same = renamed.upsert_criterion(labelled("New")).unwrap();
        assert!(same.is_identical(&renamed));
    }

    #[test]
    fn test_unknown_criterion_type_rejected() {
        let result = ListFilterModel::new(FilterMode::Tags).make_criterion("url");
        assert!(matches!(result, Err(FilterError::UnknownCriterionType { .. })));
    }

    #[test]
    fn test_criterion_from_other_mode_rejected() {
        let scene_url = url(&scenes(), "a");
        let performers = ListFilterModel::new(FilterMode::Performers);
        assert!(performers.upsert_criterion(scene_url).is_err());
    }

    #[test]
    fn test_invalid_criterion_dropped() {
        let filter = scenes();
        let updated = filter.upsert_criterion(url(&filter, "")).unwrap();
        assert!(updated.criteria().is_empty());
    }

    #[test]
    fn test_hierarchical_dedup_last_wins() {
        let filter = scenes();
        let first = criterion(
            &filter,
            "tags",
            CriterionModifier::IncludesAll,
            CriterionValue::Hierarchical(HierarchicalValue::new(vec![
                LabeledId::new("1", "Action"),
                LabeledId::new("2", "Comedy"),
            ])),
        );
        let second = tags(&filter, &["2", "1"], 0).with_modifier(CriterionModifier::Includes).unwrap();
        let updated = filter.set_criteria(vec![first, second.clone()]).unwrap();
        assert_eq!(updated.criteria(), &[second]);
    }

    #[test]
    fn test_reset_policies() {
        let filter = scenes()
            .with_sort_by(RANDOM_SORT)
            .with_random_seed(42)
            .with_current_page(5);

        let zoomed = filter.with_zoom_index(2).with_display_mode(DisplayMode::Wall);
        assert_eq!(zoomed.current_page(), 5);
        assert_eq!(zoomed.random_seed(), 42);

        let searched = filter.with_search_term("beach");
        assert_eq!(searched.current_page(), 1);
        assert_eq!(searched.random_seed(), NO_RANDOM_SEED);

        let sorted = filter.with_sort_direction(SortDirection::Desc);
        assert_eq!(sorted.current_page(), 1);
        assert_eq!(sorted.random_seed(), 42);

        let edited = filter.upsert_criterion(url(&filter, "x")).unwrap();
        assert_eq!(edited.current_page(), 1);
        assert_eq!(edited.random_seed(), NO_RANDOM_SEED);

        let unchanged = filter.remove_criterion("url");
        assert_eq!(unchanged, filter);
    }

    #[test]
    fn test_unsupported_values_ignored() {
        let filter = ListFilterModel::new(FilterMode::Studios);
        assert_eq!(filter.with_display_mode(DisplayMode::Wall), filter);
        assert_eq!(filter.with_sort_by("o_counter"), filter);
        assert_eq!(filter.with_zoom_index(99).zoom_index(), FilterDefaults::MAX_ZOOM_INDEX);
    }

    #[test]
    fn test_query_string_encoding() {
        let filter = scenes();
        let filter = filter
            .upsert_criterion(tags(&filter, &["1", "2"], -1))
            .unwrap()
            .with_search_term("a b")
            .with_sort_direction(SortDirection::Desc)
            .with_current_page(2);
        assert_eq!(
            filter.make_query_parameters(),
            "q=a+b&sortdir=desc&page=2&tags=INCLUDES_ALL%3A1%7C2%3Bdepth%3A-1"
        );
    }

    #[test]
    fn test_parse_is_lenient() {
        let filter = scenes().configure_from_query_string(
            "?q=x&sortby=bogus&sortdir=sideways&disp=9&perPage=0&page=-2&z=7&random=abc\
             &unknown=1&url=EQUALS:a.com&duration=BETWEEN:x,y&url=EQUALS:b.com",
        );
        assert_eq!(filter.search_term(), "x");
        assert_eq!(filter.sort_by(), "date");
        assert_eq!(filter.sort_direction(), SortDirection::Asc);
        assert_eq!(filter.display_mode(), DisplayMode::Grid);
        assert_eq!(filter.items_per_page(), FilterDefaults::ITEMS_PER_PAGE);
        assert_eq!(filter.current_page(), 1);
        assert_eq!(filter.zoom_index(), FilterDefaults::ZOOM_INDEX);
        assert_eq!(filter.random_seed(), NO_RANDOM_SEED);
        assert_eq!(filter.criteria().len(), 1);
        assert_eq!(
            filter.criterion("url").unwrap().value(),
            &CriterionValue::String("b.com".to_string())
        );
    }

    #[test]
    fn test_json_round_trip() {
        let filter = scenes();
        let filter = filter
            .upsert_criterion(tags(&filter, &["5"], 2))
            .unwrap()
            .with_sort_by(RANDOM_SORT)
            .with_random_seed(77)
            .with_current_page(3);
        let json = filter.to_json().unwrap();
        assert_eq!(scenes().configure_from_json(&json).unwrap(), filter);
    }

    #[test]
    fn test_json_errors() {
        let filter = scenes();
        assert!(matches!(
            filter.configure_from_json(r#"{"mode":"tags"}"#),
            Err(FilterError::ModeMismatch { .. })
        ));
        assert!(matches!(
            filter.configure_from_json(
                r#"{"mode":"scenes","c":[{"type":"parentTags","modifier":"INCLUDES","value":{"hierarchical":{}}}]}"#
            ),
            Err(FilterError::UnknownCriterionType { .. })
        ));
        assert!(matches!(filter.configure_from_json("{"), Err(FilterError::Json(_))));

        let minimal = filter.configure_from_json(r#"{"mode":"scenes"}"#).unwrap();
        assert_eq!(minimal, filter);
    }

    #[test]
    fn test_make_request() {
        let filter = scenes();
        let rating = criterion(
            &filter,
            "rating",
            CriterionModifier::GreaterThan,
            CriterionValue::Rating(RatingValue::single(60)),
        );
        let request = filter
            .upsert_criterion(rating)
            .unwrap()
            .with_sort_by(RANDOM_SORT)
            .with_random_seed(9)
            .make_request();
        assert_eq!(request.filter.seed, Some(9));
        assert_eq!(request.filter.sort.as_deref(), Some(RANDOM_SORT));
        assert_eq!(
            request.object_filter.get("rating100"),
            Some(&CriterionInput::Int {
                value: Some(60),
                value2: None,
                modifier: CriterionModifier::GreaterThan,
            })
        );

        let unpinned = filter.with_sort_by(RANDOM_SORT).make_request();
        assert_eq!(unpinned.filter.seed, None);
    }

    fn arb_criteria() -> impl Strategy<Value = Vec<Criterion>> {
        let filter = scenes();
        let url = "[a-z0-9:/.|;,%=+& ]{1,12}".prop_map({
            let filter = filter.clone();
            move |s| url(&filter, &s)
        });
        let tags = (
            prop::collection::vec("[0-9]{1,3}", 1..4),
            prop::collection::vec("[0-9]{1,3}", 0..3),
            -1i32..4,
        )
            .prop_map({
                let filter = filter.clone();
                move |(items, excluded, depth)| {
                    criterion(
                        &filter,
                        "tags",
                        CriterionModifier::Includes,
                        CriterionValue::Hierarchical(
                            HierarchicalValue::new(items.iter().map(|i| LabeledId::new(i.as_str(), "T|a=g;")).collect())
                                .with_excluded(excluded.iter().map(|i| LabeledId::new(i.as_str(), "")).collect())
                                .with_depth(depth),
                        ),
                    )
                }
            });
        let duration = (-100i64..10_000, -100i64..10_000).prop_map({
            let filter = filter.clone();
            move |(a, b)| {
                criterion(
                    &filter,
                    "duration",
                    CriterionModifier::Between,
                    CriterionValue::Range(NumberRange::between(a, b)),
                )
            }
        });
        let rating = (0i32..=100).prop_map({
            let filter = filter.clone();
            move |r| {
                criterion(
                    &filter,
                    "rating",
                    CriterionModifier::LessThan,
                    CriterionValue::Rating(RatingValue::single(r)),
                )
            }
        });
        let captions = prop::collection::vec("[a-z|,]{1,4}", 1..3).prop_map({
            let filter = filter.clone();
            move |list| {
                criterion(
                    &filter,
                    "captions",
                    CriterionModifier::Includes,
                    CriterionValue::StringList(list),
                )
            }
        });
        let missing = prop::sample::select(vec!["title", "cover", "studio"]).prop_map({
            let filter = filter.clone();
            move |v| {
                criterion(
                    &filter,
                    "is_missing",
                    CriterionModifier::Equals,
                    CriterionValue::Enum(v.to_string()),
                )
            }
        });
        let null_check = Just(
            filter
                .make_criterion("director")
                .unwrap()
                .with_modifier(CriterionModifier::IsNull)
                .unwrap(),
        );

        prop::collection::vec(
            prop_oneof![url, tags, duration, rating, captions, missing, null_check],
            0..6,
        )
    }

    fn arb_filter() -> impl Strategy<Value = ListFilterModel> {
        let options = filter_options(FilterMode::Scenes);
        (
            "[a-z &+=%]{0,8}",
            prop::sample::select(options.sort_by_options.clone()),
            prop::bool::ANY,
            prop::sample::select(options.display_mode_options.clone()),
            1u32..200,
            1u32..50,
            0u32..=FilterDefaults::MAX_ZOOM_INDEX,
            -1i64..1_000_000,
            arb_criteria(),
        )
            .prop_map(|(q, sort, desc, disp, per_page, page, zoom, seed, criteria)| {
                let mut filter = scenes();
                filter.search_term = q;
                filter.sort_by = sort.to_string();
                filter.sort_direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                filter.display_mode = disp;
                filter.items_per_page = per_page;
                filter.current_page = page;
                filter.zoom_index = zoom;
                filter.random_seed = seed;
                filter.criteria = normalize_criteria(criteria);
                filter
            })
    }

    proptest! {
        #[test]
        fn prop_query_string_round_trip(filter in arb_filter()) {
            let query = filter.make_query_parameters();
            prop_assert_eq!(scenes().configure_from_query_string(&query), filter);
        }

        #[test]
        fn prop_json_round_trip(filter in arb_filter()) {
            let json = filter.to_json().unwrap();
            prop_assert_eq!(scenes().configure_from_json(&json).unwrap(), filter);
        }

        #[test]
        fn prop_query_string_is_stable(filter in arb_filter()) {
            let query = filter.make_query_parameters();
            let reparsed = scenes().configure_from_query_string(&query);
            prop_assert_eq!(reparsed.make_query_parameters(), query);
        }
    }
}
