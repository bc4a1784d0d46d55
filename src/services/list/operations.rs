// 批量操作
//
// 操作作用于（当前结果，当前过滤器，选中的 id），可以声明完成后重新查询。

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::external::QueryResult;
use crate::models::ListFilterModel;

/// 操作执行时可见的列表状态
#[derive(Clone, Copy)]
pub struct OperationContext<'a> {
    pub result: Option<&'a QueryResult>,
    pub filter: &'a ListFilterModel,
    pub selected_ids: &'a BTreeSet<String>,
}

#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn run(&self, context: OperationContext<'_>) -> anyhow::Result<()>;
}

pub type OperationPredicate = Arc<dyn Fn(&OperationContext<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct ListOperation {
    pub text: String,
    /// 完成后重新查询（并清空结果缓存）
    pub post_refetch: bool,
    /// 为 None 时总是显示
    pub is_displayed: Option<OperationPredicate>,
    pub handler: Arc<dyn OperationHandler>,
}

impl fmt::Debug for ListOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOperation")
            .field("text", &self.text)
            .field("post_refetch", &self.post_refetch)
            .finish()
    }
}

impl ListOperation {
    pub fn new(text: impl Into<String>, handler: Arc<dyn OperationHandler>) -> Self {
        Self {
            text: text.into(),
            post_refetch: false,
            is_displayed: None,
            handler,
        }
    }

    pub fn with_post_refetch(mut self) -> Self {
        self.post_refetch = true;
        self
    }

    pub fn displayed_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&OperationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.is_displayed = Some(Arc::new(predicate));
        self
    }

    pub fn is_displayed(&self, context: &OperationContext<'_>) -> bool {
        self.is_displayed
            .as_ref()
            .map(|predicate| predicate(context))
            .unwrap_or(true)
    }
}

/// 至少选中一项时显示
pub fn show_when_selected(context: &OperationContext<'_>) -> bool {
    !context.selected_ids.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterMode;

    struct Noop;

    #[async_trait]
    impl OperationHandler for Noop {
        async fn run(&self, _context: OperationContext<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_displayed_predicate() {
        let filter = ListFilterModel::new(FilterMode::Scenes);
        let mut ids = BTreeSet::new();
        let always = ListOperation::new("Export", Arc::new(Noop));
        let selected_only = ListOperation::new("Delete", Arc::new(Noop)).displayed_when(show_when_selected);

        let context = OperationContext {
            result: None,
            filter: &filter,
            selected_ids: &ids,
        };
        assert!(always.is_displayed(&context));
        assert!(!selected_only.is_displayed(&context));

        ids.insert("1".to_string());
        let context = OperationContext {
            result: None,
            filter: &filter,
            selected_ids: &ids,
        };
        assert!(selected_only.is_displayed(&context));
    }
}
