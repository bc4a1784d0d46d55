// 列表控制器
//
// 每个挂载的列表视图持有一个控制器，负责让过滤器与以下状态保持一致：
// - 导航位置（查询字符串）
// - 偏好存储中的视图设置
// - 服务器上保存的默认过滤器
// - 分页结果与多选状态
//
// 每次查询以请求指纹为键，只有最后发起且与当前过滤器一致的查询结果会被应用。

use anyhow::anyhow;
use std::sync::Arc;

use super::navigation::Location;
use super::operations::{ListOperation, OperationContext};
use super::pagination::{clamp_page, page_count, CountCache, PageNavigation};
use super::persistence::{stored_display_mode, view_preferences, PersistenceLevel};
use super::selection::Selection;
use crate::database::SavedFilterService;
use crate::external::{QueryError, QueryResult, QueryService};
use crate::models::{
    Criterion, DisplayMode, FilterError, FilterMode, FindFilterRequest, ListFilterModel, SavedFilter,
    SortDirection, NO_RANDOM_SEED,
};
use crate::services::config::FilterConfiguration;
use crate::services::error::StoreError;
use crate::services::preference_store::{PreferenceStore, ViewPreferences};

/// 查询前对过滤器的附加修改（不写入导航位置）
pub type FilterHook = Arc<dyn Fn(ListFilterModel) -> ListFilterModel + Send + Sync>;

/// 控制器选项
#[derive(Clone)]
pub struct ListControllerOptions {
    /// 偏好存储中的键
    pub view_key: String,
    pub mode: FilterMode,
    pub persistence: PersistenceLevel,
    pub configuration: FilterConfiguration,
    pub filter_hook: Option<FilterHook>,
    pub operations: Vec<ListOperation>,
}

impl ListControllerOptions {
    pub fn new(mode: FilterMode) -> Self {
        Self {
            view_key: mode.as_str().to_string(),
            mode,
            persistence: PersistenceLevel::None,
            configuration: FilterConfiguration::default(),
            filter_hook: None,
            operations: Vec::new(),
        }
    }

    pub fn with_view_key(mut self, view_key: impl Into<String>) -> Self {
        self.view_key = view_key.into();
        self
    }

    pub fn with_persistence(mut self, persistence: PersistenceLevel) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_configuration(mut self, configuration: FilterConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_filter_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(ListFilterModel) -> ListFilterModel + Send + Sync + 'static,
    {
        self.filter_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_operation(mut self, operation: ListOperation) -> Self {
        self.operations.push(operation);
        self
    }
}

/// 控制器依赖的外部协作者
#[derive(Clone)]
pub struct ListCollaborators {
    pub query_service: Arc<dyn QueryService>,
    pub location: Arc<dyn Location>,
    pub preference_store: Option<Arc<dyn PreferenceStore>>,
    pub saved_filters: Option<Arc<dyn SavedFilterService>>,
}

impl ListCollaborators {
    pub fn new(query_service: Arc<dyn QueryService>, location: Arc<dyn Location>) -> Self {
        Self {
            query_service,
            location,
            preference_store: None,
            saved_filters: None,
        }
    }

    pub fn with_preference_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.preference_store = Some(store);
        self
    }

    pub fn with_saved_filters(mut self, saved_filters: Arc<dyn SavedFilterService>) -> Self {
        self.saved_filters = Some(saved_filters);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Initialized,
    Unmounted,
}

/// 写入导航位置的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Replace,
    Push,
}

/// 已发起的查询
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub key: String,
    pub request: FindFilterRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 结果已应用；页码被修正时需要再查询一次
    Applied { needs_refetch: bool },
    /// 结果已过期，被丢弃
    Discarded,
}

pub struct ListController {
    options: ListControllerOptions,
    collaborators: ListCollaborators,
    state: ControllerState,
    mount_path: Option<String>,
    filter: ListFilterModel,
    pending_key: Option<String>,
    loaded_key: Option<String>,
    result: Option<QueryResult>,
    loading: bool,
    error: Option<QueryError>,
    count_cache: CountCache,
    selection: Selection,
    sidebar_collapsed: bool,
}

impl ListController {
    pub fn new(options: ListControllerOptions, collaborators: ListCollaborators) -> Self {
        let filter = ListFilterModel::with_defaults(
            options.mode,
            options.configuration.filter_defaults(options.mode),
        );
        Self {
            options,
            collaborators,
            state: ControllerState::Uninitialized,
            mount_path: None,
            filter,
            pending_key: None,
            loaded_key: None,
            result: None,
            loading: false,
            error: None,
            count_cache: CountCache::default(),
            selection: Selection::new(),
            sidebar_collapsed: false,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn filter(&self) -> &ListFilterModel {
        &self.filter
    }

    pub fn result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&QueryError> {
        self.error.as_ref()
    }

    /// 总数；条件变化后的查询完成前为 None
    pub fn total_count(&self) -> Option<i64> {
        self.count_cache.count()
    }

    pub fn page_count(&self) -> Option<u32> {
        self.total_count()
            .map(|count| page_count(count, self.filter.items_per_page()))
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn criterion_labels(&self) -> Vec<String> {
        self.filter
            .criterion_labels(self.options.configuration.rating_system)
    }

    fn base_filter(&self) -> ListFilterModel {
        ListFilterModel::with_defaults(
            self.options.mode,
            self.options.configuration.filter_defaults(self.options.mode),
        )
    }

    fn owns_location(&self) -> bool {
        self.mount_path.as_deref() == Some(self.collaborators.location.pathname().as_str())
    }

    /// 挂载：按优先级决定初始过滤器
    ///
    /// 1. 导航位置中的查询参数
    /// 2. ALL：服务器上的默认过滤器（回到第一页，请求新随机种子）
    /// 3. VIEW：偏好存储中的显示模式
    /// 4. 空过滤器
    pub async fn mount(&mut self) {
        let location = Arc::clone(&self.collaborators.location);
        self.mount_path = Some(location.pathname());

        let base = self.base_filter();
        let search = location.search();
        let preferences = self.load_preferences().await;

        let filter = if !search.is_empty() {
            base.configure_from_query_string(&search)
        } else {
            match self.options.persistence {
                PersistenceLevel::All => self.load_default_filter(&base).await,
                PersistenceLevel::View => match preferences
                    .as_ref()
                    .and_then(|p| stored_display_mode(&base, p))
                {
                    Some(display_mode) => base.with_display_mode(display_mode),
                    None => base,
                },
                PersistenceLevel::None => base,
            }
        };

        if let Some(preferences) = &preferences {
            self.sidebar_collapsed = preferences.sidebar_collapsed;
        }

        self.filter = filter;
        self.state = ControllerState::Initialized;
        self.pending_key = None;
        self.loaded_key = None;
        self.loading = false;
        self.count_cache.clear();
        self.selection.select_none();

        let query = self.filter.make_query_parameters();
        if query != search {
            location.replace(&query);
        }
        tracing::debug!("列表 {} 已挂载: {}", self.options.view_key, query);
    }

    /// 卸载后不再写入任何状态，迟到的查询结果被丢弃
    pub fn unmount(&mut self) {
        self.state = ControllerState::Unmounted;
        self.pending_key = None;
        self.loading = false;
    }

    async fn load_preferences(&self) -> Option<ViewPreferences> {
        if self.options.persistence == PersistenceLevel::None {
            return None;
        }
        let store = self.collaborators.preference_store.as_ref()?;
        match store.get(&self.options.view_key).await {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!("读取视图偏好失败 {}: {}", self.options.view_key, e);
                None
            }
        }
    }

    async fn load_default_filter(&self, base: &ListFilterModel) -> ListFilterModel {
        let Some(saved_filters) = &self.collaborators.saved_filters else {
            return base.clone();
        };

        match saved_filters.find_default(self.options.mode).await {
            Ok(Some(saved)) => match saved.to_filter(base) {
                Ok(filter) => {
                    tracing::info!("使用 {} 的默认过滤器", self.options.mode);
                    filter.with_current_page(1).with_random_seed(NO_RANDOM_SEED)
                }
                Err(e) => {
                    tracing::warn!("默认过滤器无效，使用空过滤器: {}", e);
                    base.clone()
                }
            },
            Ok(None) => base.clone(),
            Err(e) => {
                tracing::warn!("读取默认过滤器失败: {}", e);
                base.clone()
            }
        }
    }

    /// 外部导航（后退 / 前进）
    ///
    /// 查询字符串为空时重新挂载；否则只有解析结果与当前过滤器不同时才替换并重新查询。
    pub async fn on_location_changed(&mut self) -> bool {
        if self.state != ControllerState::Initialized {
            return false;
        }
        if !self.owns_location() {
            tracing::debug!("位置已离开视图 {}，忽略", self.options.view_key);
            return false;
        }

        let search = self.collaborators.location.search();
        if search.is_empty() {
            self.state = ControllerState::Uninitialized;
            self.mount().await;
            self.refresh().await;
            return true;
        }

        let parsed = self.filter.configure_from_query_string(&search);
        if parsed.is_identical(&self.filter) {
            return false;
        }
        self.filter = parsed;
        self.refresh_if_stale().await;
        true
    }

    /// 替换过滤器并同步导航位置与偏好，不发起查询
    pub async fn apply_filter(&mut self, filter: ListFilterModel, history: HistoryMode) -> bool {
        if self.state != ControllerState::Initialized {
            tracing::warn!("列表 {} 未挂载，忽略过滤器修改", self.options.view_key);
            return false;
        }
        if filter.is_identical(&self.filter) {
            return false;
        }

        self.filter = filter;
        self.sync_location(history);
        if self.options.persistence == PersistenceLevel::View {
            self.persist_view_preferences().await;
        }
        true
    }

    /// 替换过滤器；请求变化时重新查询
    pub async fn set_filter(&mut self, filter: ListFilterModel) {
        if self.apply_filter(filter, HistoryMode::Replace).await {
            self.refresh_if_stale().await;
        }
    }

    pub async fn set_search_term(&mut self, term: &str) {
        let filter = self.filter.with_search_term(term);
        self.set_filter(filter).await;
    }

    pub async fn set_sort_by(&mut self, sort_by: &str) {
        let filter = self.filter.with_sort_by(sort_by);
        self.set_filter(filter).await;
    }

    pub async fn set_sort_direction(&mut self, direction: SortDirection) {
        let filter = self.filter.with_sort_direction(direction);
        self.set_filter(filter).await;
    }

    pub async fn set_display_mode(&mut self, display_mode: DisplayMode) {
        let filter = self.filter.with_display_mode(display_mode);
        self.set_filter(filter).await;
    }

    pub async fn set_zoom_index(&mut self, zoom_index: u32) {
        let filter = self.filter.with_zoom_index(zoom_index);
        self.set_filter(filter).await;
    }

    pub async fn set_items_per_page(&mut self, items_per_page: u32) {
        let filter = self.filter.with_items_per_page(items_per_page);
        self.set_filter(filter).await;
    }

    pub async fn upsert_criterion(&mut self, criterion: Criterion) -> Result<(), FilterError> {
        let filter = self.filter.upsert_criterion(criterion)?;
        self.set_filter(filter).await;
        Ok(())
    }

    pub async fn remove_criterion(&mut self, criterion_type: &str) {
        let filter = self.filter.remove_criterion(criterion_type);
        self.set_filter(filter).await;
    }

    pub async fn clear_criteria(&mut self) {
        let filter = self.filter.clear_criteria();
        self.set_filter(filter).await;
    }

    /// 重新随机排序
    pub async fn reshuffle(&mut self) {
        let filter = self.filter.reshuffle();
        self.set_filter(filter).await;
    }

    /// 翻页会新增一条历史记录
    pub async fn set_page(&mut self, page: u32) {
        let filter = self.filter.with_current_page(page);
        if self.apply_filter(filter, HistoryMode::Push).await {
            self.refresh_if_stale().await;
        }
    }

    /// 键盘翻页；总数未知时忽略
    pub async fn navigate_page(&mut self, navigation: PageNavigation) -> bool {
        let Some(pages) = self.page_count() else {
            return false;
        };
        match navigation.target(self.filter.current_page(), pages) {
            Some(page) => {
                self.set_page(page).await;
                true
            }
            None => false,
        }
    }

    pub async fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        if self.sidebar_collapsed == collapsed {
            return;
        }
        self.sidebar_collapsed = collapsed;
        self.persist_view_preferences().await;
    }

    fn sync_location(&self, history: HistoryMode) {
        let location = &self.collaborators.location;
        if !self.owns_location() {
            tracing::debug!("位置已离开视图 {}，跳过写入", self.options.view_key);
            return;
        }

        let query = self.filter.make_query_parameters();
        if query == location.search() {
            return;
        }
        match history {
            HistoryMode::Replace => location.replace(&query),
            HistoryMode::Push => location.push(&query),
        }
    }

    async fn persist_view_preferences(&self) {
        if self.options.persistence == PersistenceLevel::None {
            return;
        }
        let Some(store) = &self.collaborators.preference_store else {
            return;
        };

        let preferences = view_preferences(&self.filter, self.sidebar_collapsed);
        if let Err(e) = store.set(&self.options.view_key, preferences).await {
            tracing::warn!("保存视图偏好失败 {}: {}", self.options.view_key, e);
        }
    }

    /// 发给查询服务的请求（应用过滤器钩子之后）
    pub fn fetch_request(&self) -> FindFilterRequest {
        match &self.options.filter_hook {
            Some(hook) => hook(self.filter.clone()).make_request(),
            None => self.filter.make_request(),
        }
    }

    /// 发起查询：记录请求键，之前发起的查询全部作废
    pub fn begin_fetch(&mut self) -> Option<PendingFetch> {
        if self.state != ControllerState::Initialized {
            return None;
        }

        let request = self.fetch_request();
        let key = request.fingerprint();
        self.count_cache.on_fetch_started(&self.filter);
        self.loading = true;
        self.pending_key = Some(key.clone());
        Some(PendingFetch { key, request })
    }

    /// 处理查询结果
    ///
    /// 键与最后发起的查询不同，或与当前过滤器不一致时丢弃结果。
    /// 查询失败只记录错误，过滤器保持不变。
    pub fn complete_fetch(
        &mut self,
        key: &str,
        response: Result<QueryResult, QueryError>,
    ) -> FetchOutcome {
        if self.state != ControllerState::Initialized
            || self.pending_key.as_deref() != Some(key)
            || self.fetch_request().fingerprint() != key
        {
            tracing::debug!("丢弃过期的查询结果 {}", key);
            return FetchOutcome::Discarded;
        }

        self.pending_key = None;
        self.loading = false;

        let result = match response {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("列表 {} 查询失败: {}", self.options.view_key, e);
                self.error = Some(e);
                self.loaded_key = None;
                return FetchOutcome::Applied { needs_refetch: false };
            }
        };

        self.error = None;
        self.count_cache.on_fetch_completed(&self.filter, result.count);

        let mut updated = self.filter.clone();
        if updated.is_random_sort() && updated.random_seed() == NO_RANDOM_SEED {
            if let Some(seed) = result.random_seed {
                tracing::debug!("固定随机种子 {}", seed);
                updated = updated.with_random_seed(seed);
            }
        }

        let clamped = clamp_page(updated.current_page(), result.count, updated.items_per_page());
        if let Some(page) = clamped {
            tracing::info!(
                "页码 {} 超出范围（共 {} 项），跳转到第 {} 页",
                updated.current_page(),
                result.count,
                page
            );
            updated = updated.with_current_page(page);
        }

        self.result = Some(result);
        if updated != self.filter {
            self.filter = updated;
            self.sync_location(HistoryMode::Replace);
        }

        let needs_refetch = clamped.is_some();
        self.loaded_key = if needs_refetch {
            None
        } else {
            Some(self.fetch_request().fingerprint())
        };
        FetchOutcome::Applied { needs_refetch }
    }

    /// 查询当前过滤器；页码被修正后再查询一次
    pub async fn refresh(&mut self) {
        let service = Arc::clone(&self.collaborators.query_service);
        for _ in 0..2 {
            let Some(pending) = self.begin_fetch() else {
                return;
            };
            let response = service.find(&pending.request).await;
            match self.complete_fetch(&pending.key, response) {
                FetchOutcome::Applied { needs_refetch: true } => continue,
                _ => return,
            }
        }
    }

    /// 只在请求变化时查询（显示模式、缩放不影响请求）
    async fn refresh_if_stale(&mut self) {
        let key = self.fetch_request().fingerprint();
        if self.loaded_key.as_deref() == Some(key.as_str()) && self.error.is_none() {
            return;
        }
        self.refresh().await;
    }

    pub fn toggle_selected(&mut self, id: &str, selected: bool) {
        self.selection.toggle(id, selected);
    }

    /// Shift 多选，范围按当前页的条目顺序计算
    pub fn select_range(&mut self, target: &str) {
        let order = self.result.as_ref().map(QueryResult::item_ids).unwrap_or_default();
        self.selection.select_range(&order, target);
    }

    pub fn select_all(&mut self) {
        let ids = self.result.as_ref().map(QueryResult::item_ids).unwrap_or_default();
        self.selection.select_all(ids);
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
    }

    fn operation_context(&self) -> OperationContext<'_> {
        OperationContext {
            result: self.result.as_ref(),
            filter: &self.filter,
            selected_ids: self.selection.ids(),
        }
    }

    /// 当前可用的批量操作
    pub fn displayed_operations(&self) -> Vec<&ListOperation> {
        let context = self.operation_context();
        self.options
            .operations
            .iter()
            .filter(|operation| operation.is_displayed(&context))
            .collect()
    }

    /// 执行批量操作；声明了 post_refetch 的操作完成后清空结果缓存并重新查询
    pub async fn run_operation(&mut self, text: &str) -> anyhow::Result<()> {
        let operation = self
            .options
            .operations
            .iter()
            .find(|operation| operation.text == text)
            .cloned()
            .ok_or_else(|| anyhow!("未知的操作: {}", text))?;

        let context = self.operation_context();
        if !operation.is_displayed(&context) {
            return Err(anyhow!("操作 {} 当前不可用", operation.text));
        }
        operation.handler.run(context).await?;

        if operation.post_refetch {
            self.collaborators.query_service.invalidate().await;
            self.loaded_key = None;
            self.refresh().await;
        }
        Ok(())
    }

    /// 将当前过滤器保存为该列表类型的默认过滤器
    pub async fn save_default_filter(&self) -> Result<SavedFilter, StoreError> {
        let saved_filters = self
            .collaborators
            .saved_filters
            .as_ref()
            .ok_or_else(|| StoreError::NotFound("saved filter service".to_string()))?;
        saved_filters.set_default(&self.filter).await
    }

    /// 应用一个保存的过滤器
    pub async fn load_saved_filter(&mut self, id: &str) -> Result<(), StoreError> {
        let saved_filters = self
            .collaborators
            .saved_filters
            .clone()
            .ok_or_else(|| StoreError::NotFound("saved filter service".to_string()))?;
        let saved = saved_filters
            .find(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("saved filter {}", id)))?;

        let filter = saved.to_filter(&self.base_filter())?;
        self.set_filter(filter.with_random_seed(NO_RANDOM_SEED)).await;
        Ok(())
    }
}
