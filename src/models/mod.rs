// 过滤器模型
//
// 本模块提供列表过滤的核心数据结构，包括：
// - 条件选项与各列表类型的注册表
// - 条件（属性 + 修饰符 + 值）
// - 列表过滤器及其 URL / JSON 序列化
// - 远程查询请求结构
// - 保存的过滤器

pub mod criterion;
pub mod criterion_option;
pub mod filter;
pub mod filter_options;
pub mod modifier;
pub mod rating;
pub mod request;
pub mod saved_filter;
pub mod validation;
pub mod value;

pub use criterion::{normalize_criteria, Criterion, CriterionDocument};
pub use criterion_option::{CriterionOption, HierarchyDirection, ValueShape};
pub use filter::{FilterDefaults, ListFilterDocument, ListFilterModel, NO_RANDOM_SEED};
pub use filter_options::{
    arrange_criterion_options, filter_options, ArrangedCriterionOption, ListFilterOptions, RANDOM_SORT,
};
pub use modifier::{CriterionModifier, DisplayMode, FilterMode, SortDirection};
pub use rating::{display_to_internal, internal_to_display, RatingSystem};
pub use request::{CriterionInput, FindFilter, FindFilterRequest};
pub use saved_filter::SavedFilter;
pub use validation::FilterError;
pub use value::{CriterionValue, HierarchicalValue, LabeledId, NumberRange, RatingValue};
