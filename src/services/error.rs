// 存储错误类型（界面偏好、保存的过滤器）

use thiserror::Error;

use crate::models::FilterError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("过滤器无效: {0}")]
    Filter(#[from] FilterError),

    #[error("未找到: {0}")]
    NotFound(String),
}
