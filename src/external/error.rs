// 远程查询服务错误类型

use thiserror::Error;

/// 查询失败的原因；过滤器状态不会因查询失败而改变
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("网络错误: {0}")]
    Network(String),

    #[error("查询超时")]
    Timeout,

    #[error("HTTP 错误: 状态码 {0}")]
    Http(u16),

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("查询服务未配置")]
    NotConfigured,
}

// 实现从 reqwest::Error 到 QueryError 的转换
impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QueryError::Timeout
        } else if err.is_status() {
            match err.status() {
                Some(status) => QueryError::Http(status.as_u16()),
                None => QueryError::Network(err.to_string()),
            }
        } else if err.is_decode() {
            QueryError::Decode(err.to_string())
        } else {
            QueryError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Decode(err.to_string())
    }
}
