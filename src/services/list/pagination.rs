// 分页与总数缓存

use crate::models::{Criterion, ListFilterModel};

/// 总页数；条目数为 0 时为 0
pub fn page_count(total_count: i64, items_per_page: u32) -> u32 {
    if total_count <= 0 || items_per_page == 0 {
        return 0;
    }
    let per_page = i64::from(items_per_page);
    let pages = (total_count + per_page - 1) / per_page;
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// 当前页超出范围时应跳转到的页
pub fn clamp_page(current_page: u32, total_count: i64, items_per_page: u32) -> Option<u32> {
    let pages = page_count(total_count, items_per_page);
    // 总数为 0 时不修正页码
    if pages > 0 && current_page > pages {
        Some(pages)
    } else {
        None
    }
}

/// 键盘翻页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNavigation {
    Next,
    Previous,
    ForwardTen,
    BackTen,
    First,
    Last,
}

impl PageNavigation {
    /// 目标页，限制在 [1, pages]；没有变化时返回 None
    pub fn target(self, current_page: u32, pages: u32) -> Option<u32> {
        if pages == 0 {
            return None;
        }
        let target = match self {
            PageNavigation::Next => current_page.saturating_add(1),
            PageNavigation::Previous => current_page.saturating_sub(1),
            PageNavigation::ForwardTen => current_page.saturating_add(10),
            PageNavigation::BackTen => current_page.saturating_sub(10),
            PageNavigation::First => 1,
            PageNavigation::Last => pages,
        }
        .clamp(1, pages);

        (target != current_page).then_some(target)
    }
}

/// 总数缓存
///
/// 只有条件集合变化时才丢弃上一次的总数，翻页、排序期间总数保持不变。
#[derive(Debug, Default, Clone)]
pub struct CountCache {
    count: Option<i64>,
    criteria: Vec<Criterion>,
}

impl CountCache {
    pub fn count(&self) -> Option<i64> {
        self.count
    }

    pub fn on_fetch_started(&mut self, filter: &ListFilterModel) {
        if self.criteria.as_slice() != filter.criteria() {
            self.count = None;
        }
    }

    pub fn on_fetch_completed(&mut self, filter: &ListFilterModel, count: i64) {
        self.count = Some(count);
        self.criteria = filter.criteria().to_vec();
    }

    pub fn clear(&mut self) {
        self.count = None;
        self.criteria.clear();
    }
}
