// 目录列表过滤库
//
// 本库提供目录列表过滤的核心功能，包括：
// - 过滤条件模型与 URL / JSON 序列化
// - 远程查询客户端与结果缓存
// - 保存的过滤器（SQLite）
// - 列表控制器与界面偏好

pub mod database;
pub mod external;
pub mod models;
pub mod services;

pub use models::{Criterion, CriterionModifier, CriterionValue, FilterMode, ListFilterModel};
pub use services::{FilterConfiguration, ListController};
