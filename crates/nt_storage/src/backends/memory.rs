use async_trait::async_trait;
use nt_core::{Article, ArticleStorage, Result, StoreReport, StoredArticle};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Rows kept in insertion order; ids are assigned like a serial column.
#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<StoredArticle>,
    next_id: i64,
}

impl MemoryStore {
    pub fn insert(&mut self, article: &Article) -> bool {
        if self.rows.iter().any(|row| row.url == article.url) {
            return false;
        }
        self.next_id += 1;
        self.rows.push(StoredArticle {
            id: self.next_id,
            title: article.title.clone(),
            source: article.source.clone(),
            published_at: article.published_at,
            summary: article.summary.clone(),
            topic: article.topic.clone(),
            url: article.url.clone(),
        });
        true
    }

    pub fn latest_by_topic(&self, topic: &str, limit: usize) -> Vec<StoredArticle> {
        let needle = topic.to_lowercase();
        let mut matches: Vec<StoredArticle> = self.rows.iter()
            .filter(|row| row.topic.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        matches.truncate(limit);
        matches
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn store_articles(&self, articles: &[Article]) -> Result<StoreReport> {
        let mut store = self.store.write().await;
        let mut report = StoreReport::default();
        for article in articles {
            if store.insert(article) {
                report.inserted += 1;
            } else {
                report.skipped += 1;
            }
        }
        Ok(report)
    }

    async fn latest_by_topic(&self, topic: &str, limit: usize) -> Result<Vec<StoredArticle>> {
        let store = self.store.read().await;
        Ok(store.latest_by_topic(topic, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn article(url: &str, topic: &str, age_hours: i64) -> Article {
        Article {
            url: url.to_string(),
            title: format!("Article at {}", url),
            source: "test".to_string(),
            published_at: Utc::now() - Duration::hours(age_hours),
            content: String::new(),
            summary: None,
            topic: topic.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_url_is_ignored() {
        let storage = InMemoryStorage::new();
        let a = article("http://test.com/a", "tech", 1);

        let report = storage.store_articles(&[a.clone(), a.clone()]).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(storage.len().await, 1);

        // The first write wins; a later duplicate does not update it
        let mut changed = a.clone();
        changed.title = "Changed".to_string();
        storage.store_articles(&[changed]).await.unwrap();
        let rows = storage.latest_by_topic("tech", 5).await.unwrap();
        assert_eq!(rows[0].title, a.title);
    }

    #[tokio::test]
    async fn test_latest_by_topic_ignores_case_and_orders_by_date() {
        let storage = InMemoryStorage::new();
        storage.store_articles(&[
            article("http://test.com/old", "tech", 48),
            article("http://test.com/new", "tech", 1),
            article("http://test.com/mid", "biotech", 10),
            article("http://test.com/other", "sports", 2),
        ]).await.unwrap();

        let lower = storage.latest_by_topic("tech", 5).await.unwrap();
        let upper = storage.latest_by_topic("Tech", 5).await.unwrap();
        assert_eq!(lower, upper);
        let urls: Vec<_> = lower.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["http://test.com/new", "http://test.com/mid", "http://test.com/old"]);

        let capped = storage.latest_by_topic("tech", 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }
}
