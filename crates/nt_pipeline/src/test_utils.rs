use async_trait::async_trait;
use chrono::{Duration, Utc};
use nt_core::{
    Article, ArticleStorage, Error, FetchOptions, NewsSource, RawArticle, Result, StoreReport,
    StoredArticle,
};
use nt_storage::InMemoryStorage;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns `count` articles per topic with URLs unique to that topic.
pub struct StaticSource {
    count: usize,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for StaticSource {
    fn name(&self) -> &str {
        "Static"
    }

    async fn search(&self, topic: &str, options: &FetchOptions) -> Result<Vec<RawArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.count.min(options.page_size as usize))
            .map(|i| RawArticle {
                title: format!("{} story {}", topic, i),
                source: "Static Wire".to_string(),
                published_at: Utc::now() - Duration::hours(i as i64),
                content: format!("Body of {} story {} with enough words to summarize.", topic, i),
                url: format!("https://static.test/{}/{}", topic.to_lowercase(), i),
            })
            .collect())
    }
}

pub struct FailingSource;

#[async_trait]
impl NewsSource for FailingSource {
    fn name(&self) -> &str {
        "Failing"
    }

    async fn search(&self, _topic: &str, _options: &FetchOptions) -> Result<Vec<RawArticle>> {
        Err(Error::provider("Failing", "service unavailable (503)"))
    }
}

/// In-memory storage that refuses to store articles for one topic.
pub struct FlakyStorage {
    pub inner: InMemoryStorage,
    pub broken_topic: String,
}

#[async_trait]
impl ArticleStorage for FlakyStorage {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn store_articles(&self, articles: &[Article]) -> Result<StoreReport> {
        if articles.iter().any(|a| a.topic == self.broken_topic) {
            return Err(Error::Database("Database connection failed".to_string()));
        }
        self.inner.store_articles(articles).await
    }

    async fn latest_by_topic(&self, topic: &str, limit: usize) -> Result<Vec<StoredArticle>> {
        self.inner.latest_by_topic(topic, limit).await
    }
}
