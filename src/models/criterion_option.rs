// 条件选项 - 可过滤属性的静态描述
//
// 每个列表类型在注册表里为每个属性构造一次，之后只以引用方式共享。

use serde::Serialize;

use super::modifier::CriterionModifier;

/// 条件值形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    String,
    StringList,
    Range,
    Hierarchical,
    Rating,
    Enum,
}

/// 层级条件的展开方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyDirection {
    /// 不支持层级（如演员）
    Flat,
    /// 包含子级
    Descendants,
    /// 包含父级
    Ancestors,
}

/// 条件选项
#[derive(Debug, Clone, Serialize)]
pub struct CriterionOption {
    /// 属性标识，在同一列表类型内唯一
    #[serde(rename = "type")]
    pub criterion_type: &'static str,
    /// 标签显示名称
    pub display_name: &'static str,
    /// 请求远程服务时使用的参数名，也是 URL 中的键
    pub parameter_name: &'static str,
    pub shape: ValueShape,
    pub modifier_options: Vec<CriterionModifier>,
    pub default_modifier: CriterionModifier,
    /// 枚举条件允许的取值
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<&'static str>,
    pub hierarchy: HierarchyDirection,
}

impl PartialEq for CriterionOption {
    fn eq(&self, other: &Self) -> bool {
        self.criterion_type == other.criterion_type && self.parameter_name == other.parameter_name
    }
}

impl Eq for CriterionOption {}

impl CriterionOption {
    fn base(
        criterion_type: &'static str,
        display_name: &'static str,
        parameter_name: &'static str,
        shape: ValueShape,
        modifier_options: Vec<CriterionModifier>,
        default_modifier: CriterionModifier,
    ) -> Self {
        Self {
            criterion_type,
            display_name,
            parameter_name,
            shape,
            modifier_options,
            default_modifier,
            enum_values: Vec::new(),
            hierarchy: HierarchyDirection::Flat,
        }
    }

    /// 字符串条件
    pub fn string(criterion_type: &'static str, display_name: &'static str) -> Self {
        Self::base(
            criterion_type,
            display_name,
            criterion_type,
            ValueShape::String,
            vec![
                CriterionModifier::Equals,
                CriterionModifier::NotEquals,
                CriterionModifier::Includes,
                CriterionModifier::Excludes,
                CriterionModifier::IsNull,
                CriterionModifier::NotNull,
                CriterionModifier::MatchesRegex,
                CriterionModifier::NotMatchesRegex,
            ],
            CriterionModifier::Equals,
        )
    }

    /// 字符串列表条件
    pub fn string_list(criterion_type: &'static str, display_name: &'static str) -> Self {
        Self::base(
            criterion_type,
            display_name,
            criterion_type,
            ValueShape::StringList,
            vec![
                CriterionModifier::Includes,
                CriterionModifier::Excludes,
                CriterionModifier::IsNull,
                CriterionModifier::NotNull,
            ],
            CriterionModifier::Includes,
        )
    }

    /// 必填数值条件（没有 IS_NULL）
    pub fn mandatory_number(criterion_type: &'static str, display_name: &'static str) -> Self {
        Self::base(
            criterion_type,
            display_name,
            criterion_type,
            ValueShape::Range,
            vec![
                CriterionModifier::Equals,
                CriterionModifier::NotEquals,
                CriterionModifier::GreaterThan,
                CriterionModifier::LessThan,
                CriterionModifier::Between,
                CriterionModifier::NotBetween,
            ],
            CriterionModifier::Equals,
        )
    }

    /// 可空数值条件
    pub fn nullable_number(criterion_type: &'static str, display_name: &'static str) -> Self {
        let mut option = Self::mandatory_number(criterion_type, display_name);
        option.modifier_options.extend([CriterionModifier::IsNull, CriterionModifier::NotNull]);
        option
    }

    /// 评分条件，参数名与类型不同（例如 rating -> rating100）
    pub fn rating(
        criterion_type: &'static str,
        display_name: &'static str,
        parameter_name: &'static str,
    ) -> Self {
        let mut option = Self::nullable_number(criterion_type, display_name);
        option.parameter_name = parameter_name;
        option.shape = ValueShape::Rating;
        option
    }

    /// 层级 ID 集合条件
    pub fn hierarchical(
        criterion_type: &'static str,
        display_name: &'static str,
        parameter_name: &'static str,
        hierarchy: HierarchyDirection,
    ) -> Self {
        let mut option = Self::base(
            criterion_type,
            display_name,
            parameter_name,
            ValueShape::Hierarchical,
            vec![
                CriterionModifier::Includes,
                CriterionModifier::IncludesAll,
                CriterionModifier::Equals,
                CriterionModifier::Excludes,
                CriterionModifier::IsNull,
                CriterionModifier::NotNull,
            ],
            CriterionModifier::IncludesAll,
        );
        option.hierarchy = hierarchy;
        option
    }

    /// 单选实体条件（工作室等），默认修饰符为 INCLUDES
    pub fn single_entity(
        criterion_type: &'static str,
        display_name: &'static str,
        parameter_name: &'static str,
        hierarchy: HierarchyDirection,
    ) -> Self {
        let mut option = Self::hierarchical(criterion_type, display_name, parameter_name, hierarchy);
        option.modifier_options = vec![
            CriterionModifier::Includes,
            CriterionModifier::Excludes,
            CriterionModifier::IsNull,
            CriterionModifier::NotNull,
        ];
        option.default_modifier = CriterionModifier::Includes;
        option
    }

    /// 枚举条件
    pub fn enumeration(
        criterion_type: &'static str,
        display_name: &'static str,
        parameter_name: &'static str,
        enum_values: Vec<&'static str>,
    ) -> Self {
        let mut option = Self::base(
            criterion_type,
            display_name,
            parameter_name,
            ValueShape::Enum,
            vec![CriterionModifier::Equals],
            CriterionModifier::Equals,
        );
        option.enum_values = enum_values;
        option
    }

    /// 带 NOT_EQUALS 的枚举条件
    pub fn negatable_enumeration(
        criterion_type: &'static str,
        display_name: &'static str,
        parameter_name: &'static str,
        enum_values: Vec<&'static str>,
    ) -> Self {
        let mut option = Self::enumeration(criterion_type, display_name, parameter_name, enum_values);
        option.modifier_options.push(CriterionModifier::NotEquals);
        option
    }

    pub fn allows(&self, modifier: CriterionModifier) -> bool {
        self.modifier_options.contains(&modifier)
    }
}
