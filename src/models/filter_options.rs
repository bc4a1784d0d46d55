// 列表类型注册表
//
// 每个列表类型的可用排序、显示模式和条件选项在首次使用时构造一次，
// 之后以 &'static 引用共享给所有条件。

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;

use super::criterion_option::{CriterionOption, HierarchyDirection};
use super::modifier::{DisplayMode, FilterMode};

/// URL 中的标量参数键，条件参数名不能与之冲突
pub const SCALAR_QUERY_KEYS: [&str; 8] = ["q", "sortby", "sortdir", "disp", "perPage", "page", "z", "random"];

/// 随机排序键
pub const RANDOM_SORT: &str = "random";

/// 某个列表类型的过滤配置
#[derive(Debug, Serialize)]
pub struct ListFilterOptions {
    pub mode: FilterMode,
    pub default_sort_by: &'static str,
    pub sort_by_options: Vec<&'static str>,
    /// 第一个为默认显示模式
    pub display_mode_options: Vec<DisplayMode>,
    pub criterion_options: Vec<CriterionOption>,
    /// 默认不在侧边栏显示的条件
    pub default_hidden: Vec<&'static str>,
}

impl ListFilterOptions {
    pub fn default_display_mode(&self) -> DisplayMode {
        self.display_mode_options
            .first()
            .copied()
            .unwrap_or(DisplayMode::Grid)
    }

    pub fn find(&'static self, criterion_type: &str) -> Option<&'static CriterionOption> {
        self.criterion_options
            .iter()
            .find(|o| o.criterion_type == criterion_type)
    }

    pub fn find_by_parameter(&'static self, parameter_name: &str) -> Option<&'static CriterionOption> {
        self.criterion_options
            .iter()
            .find(|o| o.parameter_name == parameter_name)
    }

    pub fn supports_sort(&self, sort_by: &str) -> bool {
        self.sort_by_options.contains(&sort_by)
    }

    pub fn supports_display_mode(&self, mode: DisplayMode) -> bool {
        self.display_mode_options.contains(&mode)
    }
}

fn is_missing(values: Vec<&'static str>) -> CriterionOption {
    CriterionOption::enumeration("is_missing", "Is missing", "is_missing", values)
}

fn boolean(criterion_type: &'static str, display_name: &'static str, parameter_name: &'static str) -> CriterionOption {
    CriterionOption::enumeration(criterion_type, display_name, parameter_name, vec!["true", "false"])
}

fn rating() -> CriterionOption {
    CriterionOption::rating("rating", "Rating", "rating100")
}

fn tags() -> CriterionOption {
    CriterionOption::hierarchical("tags", "Tags", "tags", HierarchyDirection::Descendants)
}

fn performers() -> CriterionOption {
    CriterionOption::hierarchical("performers", "Performers", "performers", HierarchyDirection::Flat)
}

fn studios() -> CriterionOption {
    CriterionOption::single_entity("studios", "Studios", "studios", HierarchyDirection::Descendants)
}

const RESOLUTIONS: [&str; 7] = ["VERY_LOW", "LOW", "STANDARD", "STANDARD_HD", "FULL_HD", "FOUR_K", "EIGHT_K"];

lazy_static! {
    static ref SCENE_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Scenes,
        default_sort_by: "date",
        sort_by_options: vec![
            "title", "path", "rating", "organized", "o_counter", "date", "file_mod_time",
            "duration", "play_count", "created_at", "updated_at", "tag_count",
            "performer_count", RANDOM_SORT,
        ],
        display_mode_options: vec![DisplayMode::Grid, DisplayMode::List, DisplayMode::Wall, DisplayMode::Tagger],
        criterion_options: vec![
            CriterionOption::string("title", "Title"),
            CriterionOption::string("code", "Studio Code"),
            CriterionOption::string("details", "Details"),
            CriterionOption::string("director", "Director"),
            CriterionOption::string("path", "Path"),
            CriterionOption::string("url", "URL"),
            rating(),
            boolean("organized", "Organized", "organized"),
            CriterionOption::mandatory_number("o_counter", "O-Counter"),
            CriterionOption::nullable_number("duration", "Duration"),
            CriterionOption::mandatory_number("play_count", "Play Count"),
            CriterionOption::enumeration("resolution", "Resolution", "resolution", RESOLUTIONS.to_vec()),
            boolean("interactive", "Interactive", "interactive"),
            CriterionOption::string_list("captions", "Captions"),
            is_missing(vec!["title", "cover", "details", "url", "date", "studio", "movie", "performers", "tags", "stash_id"]),
            tags(),
            CriterionOption::hierarchical(
                "performerTags",
                "Performer Tags",
                "performer_tags",
                HierarchyDirection::Descendants,
            ),
            performers(),
            studios(),
            CriterionOption::hierarchical("movies", "Movies", "movies", HierarchyDirection::Flat),
            CriterionOption::mandatory_number("tag_count", "Tag Count"),
            CriterionOption::mandatory_number("performer_count", "Performer Count"),
        ],
        default_hidden: vec!["code", "director", "captions", "play_count", "tag_count", "performer_count"],
    };

    static ref PERFORMER_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Performers,
        default_sort_by: "name",
        sort_by_options: vec![
            "name", "height", "birthdate", "scenes_count", "rating", "tag_count",
            "created_at", "updated_at", RANDOM_SORT,
        ],
        display_mode_options: vec![DisplayMode::Grid, DisplayMode::List, DisplayMode::Tagger],
        criterion_options: vec![
            CriterionOption::string("name", "Name"),
            CriterionOption::string("disambiguation", "Disambiguation"),
            CriterionOption::string("aliases", "Aliases"),
            CriterionOption::string("details", "Details"),
            CriterionOption::string("url", "URL"),
            CriterionOption::string("ethnicity", "Ethnicity"),
            CriterionOption::string("country", "Country"),
            CriterionOption::negatable_enumeration(
                "gender",
                "Gender",
                "gender",
                vec!["MALE", "FEMALE", "TRANSGENDER_MALE", "TRANSGENDER_FEMALE", "INTERSEX", "NON_BINARY"],
            ),
            boolean("favorite", "Favourite", "filter_favorites"),
            rating(),
            CriterionOption::nullable_number("height_cm", "Height (cm)"),
            CriterionOption::nullable_number("age", "Age"),
            CriterionOption::mandatory_number("scene_count", "Scene Count"),
            tags(),
            studios(),
            is_missing(vec!["url", "ethnicity", "country", "aliases", "gender", "image", "details", "stash_id"]),
        ],
        default_hidden: vec!["disambiguation", "ethnicity", "height_cm"],
    };

    static ref STUDIO_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Studios,
        default_sort_by: "name",
        sort_by_options: vec!["name", "scenes_count", "rating", "created_at", "updated_at", RANDOM_SORT],
        display_mode_options: vec![DisplayMode::Grid],
        criterion_options: vec![
            CriterionOption::string("name", "Name"),
            CriterionOption::string("aliases", "Aliases"),
            CriterionOption::string("details", "Details"),
            CriterionOption::string("url", "URL"),
            rating(),
            CriterionOption::single_entity("parents", "Parent Studios", "parents", HierarchyDirection::Ancestors),
            tags(),
            CriterionOption::mandatory_number("scene_count", "Scene Count"),
            is_missing(vec!["image", "details", "stash_id"]),
        ],
        default_hidden: vec!["aliases"],
    };

    static ref TAG_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Tags,
        default_sort_by: "name",
        sort_by_options: vec!["name", "scenes_count", "performers_count", "created_at", "updated_at", RANDOM_SORT],
        display_mode_options: vec![DisplayMode::Grid, DisplayMode::List],
        criterion_options: vec![
            CriterionOption::string("name", "Name"),
            CriterionOption::string("aliases", "Aliases"),
            CriterionOption::string("description", "Description"),
            boolean("favorite", "Favourite", "favorite"),
            CriterionOption::mandatory_number("scene_count", "Scene Count"),
            CriterionOption::mandatory_number("performer_count", "Performer Count"),
            CriterionOption::hierarchical("parentTags", "Parent Tags", "parents", HierarchyDirection::Ancestors),
            CriterionOption::hierarchical("childTags", "Sub-Tags", "children", HierarchyDirection::Descendants),
            is_missing(vec!["image"]),
        ],
        default_hidden: vec!["aliases", "description"],
    };

    static ref MOVIE_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Movies,
        default_sort_by: "name",
        sort_by_options: vec!["name", "date", "duration", "rating", "scenes_count", RANDOM_SORT],
        display_mode_options: vec![DisplayMode::Grid],
        criterion_options: vec![
            studios(),
            is_missing(vec!["front_image", "back_image", "scenes"]),
            CriterionOption::string("url", "URL"),
            CriterionOption::string("name", "Name"),
            CriterionOption::string("director", "Director"),
            CriterionOption::string("synopsis", "Synopsis"),
            CriterionOption::mandatory_number("duration", "Duration"),
            rating(),
            performers(),
        ],
        default_hidden: vec!["synopsis"],
    };

    static ref GALLERY_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Galleries,
        default_sort_by: "path",
        sort_by_options: vec!["title", "path", "rating", "date", "image_count", "created_at", RANDOM_SORT],
        display_mode_options: vec![DisplayMode::Grid, DisplayMode::List, DisplayMode::Wall],
        criterion_options: vec![
            CriterionOption::string("title", "Title"),
            CriterionOption::string("details", "Details"),
            CriterionOption::string("path", "Path"),
            CriterionOption::string("url", "URL"),
            rating(),
            boolean("organized", "Organized", "organized"),
            CriterionOption::mandatory_number("image_count", "Image Count"),
            tags(),
            performers(),
            studios(),
            is_missing(vec!["title", "details", "url", "date", "studio", "performers", "tags", "scenes"]),
        ],
        default_hidden: vec!["details"],
    };

    static ref IMAGE_FILTER_OPTIONS: ListFilterOptions = ListFilterOptions {
        mode: FilterMode::Images,
        default_sort_by: "path",
        sort_by_options: vec!["title", "path", "rating", "o_counter", "filesize", "created_at", RANDOM_SORT],
        display_mode_options: vec![DisplayMode::Grid, DisplayMode::Wall],
        criterion_options: vec![
            CriterionOption::string("title", "Title"),
            CriterionOption::string("path", "Path"),
            rating(),
            boolean("organized", "Organized", "organized"),
            CriterionOption::mandatory_number("o_counter", "O-Counter"),
            CriterionOption::enumeration("resolution", "Resolution", "resolution", RESOLUTIONS.to_vec()),
            tags(),
            performers(),
            studios(),
            is_missing(vec!["title", "studio", "performers", "galleries", "tags"]),
        ],
        default_hidden: vec![],
    };
}

/// 获取列表类型的注册表
pub fn filter_options(mode: FilterMode) -> &'static ListFilterOptions {
    match mode {
        FilterMode::Scenes => &SCENE_FILTER_OPTIONS,
        FilterMode::Performers => &PERFORMER_FILTER_OPTIONS,
        FilterMode::Studios => &STUDIO_FILTER_OPTIONS,
        FilterMode::Tags => &TAG_FILTER_OPTIONS,
        FilterMode::Movies => &MOVIE_FILTER_OPTIONS,
        FilterMode::Galleries => &GALLERY_FILTER_OPTIONS,
        FilterMode::Images => &IMAGE_FILTER_OPTIONS,
    }
}

/// 侧边栏中的条件选项
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangedCriterionOption {
    pub option: &'static CriterionOption,
    pub show_in_sidebar: bool,
}

/// 按保存的顺序排列条件选项
///
/// - 保存顺序中不存在的类型被忽略
/// - 保存顺序中缺少的默认选项插入到它在默认顺序中的位置
/// - 如果保存了侧边栏列表，以它为准决定是否显示
pub fn arrange_criterion_options(
    mode: FilterMode,
    saved_order: &[String],
    saved_sidebar: Option<&[String]>,
) -> Vec<ArrangedCriterionOption> {
    let options = filter_options(mode);
    let defaults: Vec<ArrangedCriterionOption> = options
        .criterion_options
        .iter()
        .map(|option| ArrangedCriterionOption {
            option,
            show_in_sidebar: !options.default_hidden.contains(&option.criterion_type),
        })
        .collect();

    let mut seen = HashSet::new();
    let mut arranged: Vec<ArrangedCriterionOption> = saved_order
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .filter_map(|t| defaults.iter().find(|d| d.option.criterion_type == t).cloned())
        .collect();

    for (index, option) in defaults.iter().enumerate() {
        if !arranged.iter().any(|a| a.option == option.option) {
            let at = index.min(arranged.len());
            arranged.insert(at, option.clone());
        }
    }

    if let Some(sidebar) = saved_sidebar {
        for entry in arranged.iter_mut() {
            entry.show_in_sidebar = sidebar.iter().any(|t| t == entry.option.criterion_type);
        }
    }

    arranged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_invariants() {
        for mode in FilterMode::ALL {
            let options = filter_options(mode);
            assert_eq!(options.mode, mode);
            assert!(options.supports_sort(options.default_sort_by));
            assert!(options.supports_sort(RANDOM_SORT));
            assert!(!options.display_mode_options.is_empty());

            let mut types = HashSet::new();
            let mut parameters = HashSet::new();
            for option in &options.criterion_options {
                assert!(types.insert(option.criterion_type), "duplicate type {}", option.criterion_type);
                assert!(parameters.insert(option.parameter_name), "duplicate parameter {}", option.parameter_name);
                assert!(!SCALAR_QUERY_KEYS.contains(&option.parameter_name));
                assert!(option.allows(option.default_modifier));
            }
            for hidden in &options.default_hidden {
                assert!(options.find(hidden).is_some());
            }
        }
    }

    #[test]
    fn test_lookup() {
        let options = filter_options(FilterMode::Scenes);
        assert_eq!(options.find("rating").unwrap().parameter_name, "rating100");
        assert_eq!(options.find_by_parameter("rating100").unwrap().criterion_type, "rating");
        assert!(options.find("parentTags").is_none());
        assert!(filter_options(FilterMode::Tags).find("parentTags").is_some());
    }

    #[test]
    fn test_arrange_default_order() {
        let arranged = arrange_criterion_options(FilterMode::Movies, &[], None);
        let types: Vec<_> = arranged.iter().map(|a| a.option.criterion_type).collect();
        assert_eq!(types[0], "studios");
        assert_eq!(types.len(), filter_options(FilterMode::Movies).criterion_options.len());
        let synopsis = arranged.iter().find(|a| a.option.criterion_type == "synopsis").unwrap();
        assert!(!synopsis.show_in_sidebar);
    }

    #[test]
    fn test_arrange_saved_order_and_sidebar() {
        let saved = vec!["rating".to_string(), "bogus".to_string(), "name".to_string()];
        let sidebar = vec!["rating".to_string()];
        let arranged = arrange_criterion_options(FilterMode::Movies, &saved, Some(&sidebar));
        let types: Vec<_> = arranged.iter().map(|a| a.option.criterion_type).collect();

        assert_eq!(
            types,
            vec![
                "studios", "is_missing", "url", "rating", "director", "synopsis", "duration", "name",
                "performers",
            ]
        );

        for entry in &arranged {
            assert_eq!(entry.show_in_sidebar, entry.option.criterion_type == "rating");
        }

        // 保存顺序中重复的类型只出现一次
        let repeated: Vec<String> = ["rating", "name", "rating"].iter().map(|t| t.to_string()).collect();
        let arranged = arrange_criterion_options(FilterMode::Movies, &repeated, None);
        let types: Vec<_> = arranged.iter().map(|a| a.option.criterion_type).collect();
        assert_eq!(types.iter().filter(|t| **t == "rating").count(), 1);
        assert_eq!(
            types,
            vec![
                "studios", "is_missing", "url", "rating", "director", "synopsis", "duration", "name",
                "performers",
            ]
        );
    }
}
