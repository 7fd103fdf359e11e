use async_trait::async_trait;
use crate::types::{Article, StoredArticle, StoreReport};
use crate::Result;

pub const DEFAULT_REPORT_SIZE: usize = 5;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Create the articles table if it does not exist yet
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert articles, ignoring any whose URL is already stored.
    ///
    /// A failing row is logged and counted; it never aborts the batch.
    async fn store_articles(&self, articles: &[Article]) -> Result<StoreReport>;

    /// Newest articles whose topic contains `topic`, ignoring case
    async fn latest_by_topic(&self, topic: &str, limit: usize) -> Result<Vec<StoredArticle>>;
}
