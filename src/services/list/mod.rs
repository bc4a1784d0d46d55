// 列表视图
//
// 挂载的列表视图的状态机：导航位置同步、偏好持久化、分页、多选与批量操作。

pub mod controller;
pub mod navigation;
pub mod operations;
pub mod pagination;
pub mod persistence;
pub mod selection;

pub use controller::{
    ControllerState, FetchOutcome, FilterHook, HistoryMode, ListCollaborators, ListController,
    ListControllerOptions, PendingFetch,
};
pub use navigation::{Location, MemoryLocation};
pub use operations::{show_when_selected, ListOperation, OperationContext, OperationHandler};
pub use pagination::{clamp_page, page_count, CountCache, PageNavigation};
pub use persistence::{stored_display_mode, view_preferences, PersistenceLevel};
pub use selection::Selection;
