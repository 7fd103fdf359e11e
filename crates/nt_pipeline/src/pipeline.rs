use std::sync::Arc;
use nt_core::{
    Article, ArticleStorage, FetchOptions, InferenceModel, NewsSource, ReportEntry, Result,
    StoreReport, TrendReport, DEFAULT_REPORT_SIZE,
};
use nt_inference::format_articles_for_prompt;
use tracing::{info, warn};

/// Fetch, summarize and store articles for one topic at a time.
pub struct TopicPipeline {
    source: Arc<dyn NewsSource>,
    inference: Arc<dyn InferenceModel>,
    storage: Arc<dyn ArticleStorage>,
    options: FetchOptions,
    report_size: usize,
}

impl TopicPipeline {
    pub fn new(
        source: Arc<dyn NewsSource>,
        inference: Arc<dyn InferenceModel>,
        storage: Arc<dyn ArticleStorage>,
    ) -> Self {
        Self {
            source,
            inference,
            storage,
            options: FetchOptions::default(),
            report_size: DEFAULT_REPORT_SIZE,
        }
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Searches the news provider and summarizes every article with content.
    ///
    /// A provider failure is logged and yields no articles. Summaries are
    /// requested one at a time, so this takes roughly `page_size` model
    /// round trips.
    pub async fn fetch(&self, topic: &str) -> Vec<Article> {
        let raw_articles = match self.source.search(topic, &self.options).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!("⚠️ Error fetching news for {} from {}: {}", topic, self.source.name(), e);
                return Vec::new();
            }
        };

        let mut articles = Vec::with_capacity(raw_articles.len());
        for raw in raw_articles.into_iter().filter(|a| a.has_content()) {
            info!("🤖 Generating summary for article: {}", raw.title);
            let summary = self.inference.try_summarize(&raw.content, topic).await;
            articles.push(Article::from_raw(raw, topic, summary));
        }
        articles
    }

    /// Fetches articles for `topic` and stores the new ones.
    pub async fn run(&self, topic: &str) -> Result<StoreReport> {
        let articles = self.fetch(topic).await;
        let report = self.storage.store_articles(&articles).await?;
        info!(
            "✅ Pipeline ran successfully for {}: {} new, {} already stored, {} failed",
            topic, report.inserted, report.skipped, report.failed
        );
        Ok(report)
    }

    pub async fn latest(&self, topic: &str) -> Result<Vec<ReportEntry>> {
        let articles = self.storage.latest_by_topic(topic, self.report_size).await?;
        Ok(articles.into_iter().map(ReportEntry::from).collect())
    }

    /// Latest articles for `topic`, running the pipeline first when fewer
    /// than a full report are stored.
    ///
    /// This means a read can trigger live provider calls.
    pub async fn formatted_report(&self, topic: &str) -> Result<Vec<ReportEntry>> {
        let articles = self.latest(topic).await?;
        if articles.len() >= self.report_size {
            return Ok(articles);
        }

        info!("🔍 Only {} stored articles for {}, fetching more", articles.len(), topic);
        if let Err(e) = self.run(topic).await {
            warn!("⚠️ Backfill for {} failed: {}", topic, e);
        }
        self.latest(topic).await
    }

    pub async fn trend(&self, topic: &str) -> Result<TrendReport> {
        let articles = self.formatted_report(topic).await?;
        let digest = format_articles_for_prompt(&articles);
        let trend_analysis = self.inference.try_analyze_trend(&digest, topic).await;
        Ok(TrendReport {
            topic: topic.to_string(),
            trend_analysis,
        })
    }
}
