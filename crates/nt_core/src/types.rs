use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An article as returned by a news provider, before summarization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub content: String,
    pub url: String,
}

impl RawArticle {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// A summarized article ready to be persisted.
///
/// The raw content is kept around only until the summary has been produced;
/// storage backends never write it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(skip)]
    pub content: String,
    pub summary: Option<String>,
    pub topic: String,
}

impl Article {
    pub fn from_raw(raw: RawArticle, topic: &str, summary: Option<String>) -> Self {
        Self {
            url: raw.url,
            title: raw.title,
            source: raw.source,
            published_at: raw.published_at,
            content: raw.content,
            summary,
            topic: topic.to_lowercase(),
        }
    }
}

/// A row read back from the article repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: i64,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub summary: Option<String>,
    pub topic: String,
    pub url: String,
}

/// Wire shape of one search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub published_date: String,
    pub url: String,
}

impl From<StoredArticle> for ReportEntry {
    fn from(article: StoredArticle) -> Self {
        Self {
            id: article.id,
            title: article.title,
            summary: article.summary,
            published_date: article.published_at.format("%Y-%m-%d").to_string(),
            url: article.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub topic: String,
    pub trend_analysis: Option<String>,
}

/// Outcome of a batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreReport {
    pub inserted: usize,
    /// Rows whose URL was already stored.
    pub skipped: usize,
    pub failed: usize,
}

impl StoreReport {
    pub fn total(&self) -> usize {
        self.inserted + self.skipped + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSubscription {
    pub topic: String,
}

/// Contents of the topic config file: `{"jobs": [{"topic": ...}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicConfig {
    pub jobs: Vec<TopicSubscription>,
}

impl TopicConfig {
    pub fn contains(&self, topic: &str) -> bool {
        self.jobs.iter().any(|job| job.topic == topic)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.jobs.iter().map(|job| job.topic.as_str())
    }
}

/// Query parameters for a provider search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub page_size: u32,
    pub sort_by: String,
    pub language: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 10,
            sort_by: "relevancy".to_string(),
            language: "en".to_string(),
        }
    }
}
