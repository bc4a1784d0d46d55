use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::QueryError;
use crate::models::FindFilterRequest;

/// 列表中的一项，除 id 外的字段原样保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: serde_json::Map::new(),
        }
    }
}

/// 一页查询结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub items: Vec<CatalogItem>,
    pub count: i64,
    /// 服务端为随机排序生成的种子
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<i64>,
}

impl QueryResult {
    pub fn item_ids(&self) -> Vec<String> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }
}

/// 远程查询服务
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn find(&self, request: &FindFilterRequest) -> Result<QueryResult, QueryError>;

    /// 丢弃缓存的结果（批量操作修改数据后调用）
    async fn invalidate(&self) {}
}

/// 通过 HTTP 调用远程查询服务
#[derive(Clone)]
pub struct HttpQueryService {
    client: Client,
    base_url: Option<String>,
}

impl HttpQueryService {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Self::build_client(),
            base_url: Some(base_url),
        }
    }

    /// 从 CATALOG_API_URL 读取服务地址；未设置时所有查询返回 NotConfigured
    pub fn from_env() -> Self {
        match std::env::var("CATALOG_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => {
                tracing::warn!("CATALOG_API_URL 未设置，远程查询不可用");
                Self {
                    client: Self::build_client(),
                    base_url: None,
                }
            }
        }
    }

    fn build_client() -> Client {
        Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            })
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    fn endpoint(&self, request: &FindFilterRequest) -> Result<String, QueryError> {
        let base_url = self.base_url.as_ref().ok_or(QueryError::NotConfigured)?;
        Ok(format!("{}/{}/find", base_url, request.mode))
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn find(&self, request: &FindFilterRequest) -> Result<QueryResult, QueryError> {
        let url = self.endpoint(request)?;
        tracing::debug!("POST {} page {}", url, request.filter.page);

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            return Err(QueryError::Http(response.status().as_u16()));
        }

        let result: QueryResult = response.json().await?;
        Ok(result)
    }
}
