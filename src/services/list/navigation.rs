// 导航位置
//
// 控制器通过 Location 读写当前路径与查询字符串，不直接依赖浏览器。

use std::sync::{Mutex, MutexGuard};

/// 当前导航位置
pub trait Location: Send + Sync {
    fn pathname(&self) -> String;

    /// 查询字符串，不含前导 `?`
    fn search(&self) -> String;

    /// 替换当前历史记录
    fn replace(&self, search: &str);

    /// 新增一条历史记录
    fn push(&self, search: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    pathname: String,
    search: String,
}

#[derive(Debug)]
struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
}

/// 内存中的导航历史，支持后退 / 前进
#[derive(Debug)]
pub struct MemoryLocation {
    history: Mutex<History>,
}

impl MemoryLocation {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self::with_search(pathname, "")
    }

    pub fn with_search(pathname: impl Into<String>, search: &str) -> Self {
        Self {
            history: Mutex::new(History {
                entries: vec![HistoryEntry {
                    pathname: pathname.into(),
                    search: strip_question_mark(search).to_string(),
                }],
                index: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current(&self) -> HistoryEntry {
        let history = self.lock();
        history.entries[history.index].clone()
    }

    /// 跳转到另一个路径（用户离开当前视图）
    pub fn navigate(&self, pathname: &str, search: &str) {
        let mut history = self.lock();
        let index = history.index + 1;
        history.entries.truncate(index);
        history.entries.push(HistoryEntry {
            pathname: pathname.to_string(),
            search: strip_question_mark(search).to_string(),
        });
        history.index = index;
    }

    /// 后退；已经在最早的记录时返回 false
    pub fn back(&self) -> bool {
        let mut history = self.lock();
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        true
    }

    pub fn forward(&self) -> bool {
        let mut history = self.lock();
        if history.index + 1 >= history.entries.len() {
            return false;
        }
        history.index += 1;
        true
    }

    pub fn history_len(&self) -> usize {
        self.lock().entries.len()
    }
}

impl Location for MemoryLocation {
    fn pathname(&self) -> String {
        self.current().pathname
    }

    fn search(&self) -> String {
        self.current().search
    }

    fn replace(&self, search: &str) {
        let mut history = self.lock();
        let index = history.index;
        history.entries[index].search = strip_question_mark(search).to_string();
    }

    fn push(&self, search: &str) {
        let pathname = self.pathname();
        self.navigate(&pathname, search);
    }
}

fn strip_question_mark(search: &str) -> &str {
    search.strip_prefix('?').unwrap_or(search)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_push() {
        let location = MemoryLocation::with_search("/scenes", "?page=2");
        assert_eq!(location.search(), "page=2");

        location.replace("page=3");
        assert_eq!(location.history_len(), 1);
        assert_eq!(location.search(), "page=3");

        location.push("page=4");
        assert_eq!(location.history_len(), 2);
        assert_eq!(location.pathname(), "/scenes");

        assert!(location.back());
        assert_eq!(location.search(), "page=3");
        assert!(!location.back());
        assert!(location.forward());
        assert_eq!(location.search(), "page=4");
        assert!(!location.forward());
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let location = MemoryLocation::new("/tags");
        location.push("page=2");
        location.push("page=3");
        location.back();
        location.back();
        location.push("q=x");
        assert_eq!(location.history_len(), 2);
        assert!(!location.forward());
        assert_eq!(location.search(), "q=x");
    }
}
