// 多选状态
//
// 选中集合独立于过滤器；Shift 多选只在当前渲染的条目顺序内计算范围。

use std::collections::BTreeSet;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selection {
    selected: BTreeSet<String>,
    last_clicked: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn last_clicked(&self) -> Option<&str> {
        self.last_clicked.as_deref()
    }

    /// 单击选中 / 取消选中，并记录为最后点击的条目
    pub fn toggle(&mut self, id: &str, selected: bool) {
        self.last_clicked = Some(id.to_string());
        if selected {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
    }

    /// Shift 多选：选中从最后点击的条目到目标条目之间的连续范围
    ///
    /// 没有最后点击的条目时从第一项开始；最后点击的条目或目标不在当前页时不做任何事。
    pub fn select_range(&mut self, item_order: &[String], target: &str) {
        let start = match &self.last_clicked {
            Some(last) => match item_order.iter().position(|id| id == last) {
                Some(index) => index,
                None => {
                    tracing::debug!("Last clicked item {} is not on this page, ignoring range", last);
                    return;
                }
            },
            None => 0,
        };
        let Some(end) = item_order.iter().position(|id| id == target) else {
            return;
        };

        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        self.selected = item_order[from..=to].iter().cloned().collect();
    }

    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.selected = ids.into_iter().collect();
        self.last_clicked = None;
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
        self.last_clicked = None;
    }
}
