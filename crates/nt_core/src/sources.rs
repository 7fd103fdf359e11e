use async_trait::async_trait;
use crate::types::{FetchOptions, RawArticle};
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the news provider
    fn name(&self) -> &str;

    /// Searches the provider for articles matching `topic`
    async fn search(&self, topic: &str, options: &FetchOptions) -> Result<Vec<RawArticle>>;
}
