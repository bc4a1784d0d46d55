use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 条件比较修饰符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionModifier {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    IsNull,
    NotNull,
    Includes,
    IncludesAll,
    Excludes,
    MatchesRegex,
    NotMatchesRegex,
    Between,
    NotBetween,
}

impl CriterionModifier {
    pub const ALL: [CriterionModifier; 13] = [
        CriterionModifier::Equals,
        CriterionModifier::NotEquals,
        CriterionModifier::GreaterThan,
        CriterionModifier::LessThan,
        CriterionModifier::IsNull,
        CriterionModifier::NotNull,
        CriterionModifier::Includes,
        CriterionModifier::IncludesAll,
        CriterionModifier::Excludes,
        CriterionModifier::MatchesRegex,
        CriterionModifier::NotMatchesRegex,
        CriterionModifier::Between,
        CriterionModifier::NotBetween,
    ];

    /// URL 与 JSON 中使用的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionModifier::Equals => "EQUALS",
            CriterionModifier::NotEquals => "NOT_EQUALS",
            CriterionModifier::GreaterThan => "GREATER_THAN",
            CriterionModifier::LessThan => "LESS_THAN",
            CriterionModifier::IsNull => "IS_NULL",
            CriterionModifier::NotNull => "NOT_NULL",
            CriterionModifier::Includes => "INCLUDES",
            CriterionModifier::IncludesAll => "INCLUDES_ALL",
            CriterionModifier::Excludes => "EXCLUDES",
            CriterionModifier::MatchesRegex => "MATCHES_REGEX",
            CriterionModifier::NotMatchesRegex => "NOT_MATCHES_REGEX",
            CriterionModifier::Between => "BETWEEN",
            CriterionModifier::NotBetween => "NOT_BETWEEN",
        }
    }

    /// 标签中显示的文本
    pub fn display_name(&self) -> &'static str {
        match self {
            CriterionModifier::Equals => "is",
            CriterionModifier::NotEquals => "is not",
            CriterionModifier::GreaterThan => "is greater than",
            CriterionModifier::LessThan => "is less than",
            CriterionModifier::IsNull => "is null",
            CriterionModifier::NotNull => "is not null",
            CriterionModifier::Includes => "includes",
            CriterionModifier::IncludesAll => "includes all",
            CriterionModifier::Excludes => "excludes",
            CriterionModifier::MatchesRegex => "matches regex",
            CriterionModifier::NotMatchesRegex => "not matches regex",
            CriterionModifier::Between => "between",
            CriterionModifier::NotBetween => "not between",
        }
    }

    /// IS_NULL / NOT_NULL 不需要值
    pub fn is_null_check(&self) -> bool {
        matches!(self, CriterionModifier::IsNull | CriterionModifier::NotNull)
    }

    /// BETWEEN / NOT_BETWEEN 需要上下两个边界
    pub fn is_range(&self) -> bool {
        matches!(self, CriterionModifier::Between | CriterionModifier::NotBetween)
    }
}

impl fmt::Display for CriterionModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriterionModifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CriterionModifier::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("Invalid criterion modifier: {}", s))
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

/// 列表显示模式（URL 中以整数编码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DisplayMode {
    Grid,
    List,
    Wall,
    Tagger,
}

impl DisplayMode {
    pub fn code(&self) -> u8 {
        match self {
            DisplayMode::Grid => 0,
            DisplayMode::List => 1,
            DisplayMode::Wall => 2,
            DisplayMode::Tagger => 3,
        }
    }
}

impl From<DisplayMode> for u8 {
    fn from(mode: DisplayMode) -> Self {
        mode.code()
    }
}

impl TryFrom<u8> for DisplayMode {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DisplayMode::Grid),
            1 => Ok(DisplayMode::List),
            2 => Ok(DisplayMode::Wall),
            3 => Ok(DisplayMode::Tagger),
            _ => Err(format!("Invalid display mode: {}", code)),
        }
    }
}

/// 列表类型，决定哪些条件可用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Scenes,
    Performers,
    Studios,
    Tags,
    Movies,
    Galleries,
    Images,
}

impl FilterMode {
    pub const ALL: [FilterMode; 7] = [
        FilterMode::Scenes,
        FilterMode::Performers,
        FilterMode::Studios,
        FilterMode::Tags,
        FilterMode::Movies,
        FilterMode::Galleries,
        FilterMode::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Scenes => "scenes",
            FilterMode::Performers => "performers",
            FilterMode::Studios => "studios",
            FilterMode::Tags => "tags",
            FilterMode::Movies => "movies",
            FilterMode::Galleries => "galleries",
            FilterMode::Images => "images",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterMode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("Invalid filter mode: {}", s))
    }
}
