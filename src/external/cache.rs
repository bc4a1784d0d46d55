use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::error::QueryError;
use super::query_client::{QueryResult, QueryService};
use crate::models::FindFilterRequest;

/// 带结果缓存的查询服务
///
/// 以请求指纹为键缓存成功的结果，前进 / 后退导航时可以复用。
/// 失败的查询不缓存。
#[derive(Clone)]
pub struct CachedQueryService {
    inner: Arc<dyn QueryService>,
    cache: Cache<String, QueryResult>,
}

impl CachedQueryService {
    const DEFAULT_CAPACITY: u64 = 256;
    // 结果缓存5分钟
    const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    pub fn new(inner: Arc<dyn QueryService>) -> Self {
        Self::with_ttl(inner, Self::DEFAULT_TTL)
    }

    pub fn with_ttl(inner: Arc<dyn QueryService>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(Self::DEFAULT_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl QueryService for CachedQueryService {
    async fn find(&self, request: &FindFilterRequest) -> Result<QueryResult, QueryError> {
        let key = request.fingerprint();
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!("Cache hit for {} query (page {})", request.mode, request.filter.page);
            return Ok(cached);
        }

        let result = self.inner.find(request).await?;
        self.cache.insert(key, result.clone()).await;
        Ok(result)
    }

    async fn invalidate(&self) {
        self.cache.invalidate_all();
        self.inner.invalidate().await;
        tracing::debug!("已清空查询结果缓存");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::query_client::CatalogItem;
    use crate::models::{FilterMode, ListFilterModel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QueryService for CountingService {
        async fn find(&self, _request: &FindFilterRequest) -> Result<QueryResult, QueryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QueryResult {
                items: vec![CatalogItem::new(call.to_string())],
                count: 1,
                random_seed: None,
            })
        }
    }

    #[tokio::test]
    async fn test_cache_hit_and_invalidate() {
        let inner = Arc::new(CountingService {
            calls: AtomicUsize::new(0),
        });
        let service = CachedQueryService::new(inner.clone());
        let filter = ListFilterModel::new(FilterMode::Scenes);

        let first = service.find(&filter.make_request()).await.unwrap();
        let second = service.find(&filter.make_request()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        service.find(&filter.with_current_page(2).make_request()).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);

        service.invalidate().await;
        let third = service.find(&filter.make_request()).await.unwrap();
        assert_ne!(first, third);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }
}
