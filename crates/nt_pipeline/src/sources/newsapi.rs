//! Client for the NewsAPI `everything` search endpoint.
//! https://newsapi.org/docs/endpoints/everything

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nt_core::{Error, FetchOptions, NewsSource, RawArticle, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
const PROVIDER: &str = "NewsAPI";

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
    code: Option<String>,
    message: Option<String>,
}

/// Entries are validated one by one in [`NewsApiArticle::normalize`], so a
/// single malformed entry never fails the whole response.
#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    source: Option<ArticleSource>,
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl NewsApiArticle {
    fn normalize(self) -> Option<RawArticle> {
        let Some(url) = self.url.filter(|url| !url.trim().is_empty()) else {
            tracing::warn!("Skipping {:?}: missing url", self.title);
            return None;
        };
        let raw_date = self.published_at.unwrap_or_default();
        let published_at = match DateTime::parse_from_rfc3339(&raw_date) {
            Ok(date) => date.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!("Skipping {}: bad publishedAt {:?}: {}", url, raw_date, e);
                return None;
            }
        };
        Some(RawArticle {
            title: self.title.unwrap_or_default(),
            source: self.source.and_then(|s| s.name).unwrap_or_default(),
            published_at,
            content: self.content.unwrap_or_default(),
            url,
        })
    }
}

pub struct NewsApiSource {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NewsApiSource {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: NEWSAPI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, topic: &str, options: &FetchOptions) -> Result<Vec<RawArticle>> {
        let api_key = self.api_key.as_deref().ok_or(Error::CredentialMissing(PROVIDER))?;

        let page_size = options.page_size.to_string();

        let response = self.client
            .get(format!("{}/everything", self.base_url))
            .header("X-Api-Key", api_key)
            .query(&[
                ("q", topic),
                ("pageSize", page_size.as_str()),
                ("sortBy", options.sort_by.as_str()),
                ("language", options.language.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<NewsApiResponse>(&raw)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "no error message".to_string());
            return Err(Error::provider(PROVIDER, format!("{} ({})", message, status.as_u16())));
        }

        let body: NewsApiResponse = serde_json::from_str(&raw).map_err(|e| {
            Error::provider(PROVIDER, format!("unreadable response body: {}", e))
        })?;
        if body.status != "ok" {
            return Err(Error::provider(
                PROVIDER,
                format!(
                    "{}: {}",
                    body.code.unwrap_or_else(|| "unknown".to_string()),
                    body.message.unwrap_or_default()
                ),
            ));
        }

        tracing::debug!("{} returned {} articles for {}", PROVIDER, body.articles.len(), topic);
        Ok(body.articles.into_iter().filter_map(NewsApiArticle::normalize).collect())
    }
}
