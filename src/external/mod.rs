pub mod cache;
pub mod error;
pub mod query_client;

pub use cache::CachedQueryService;
pub use error::QueryError;
pub use query_client::{CatalogItem, HttpQueryService, QueryResult, QueryService};
