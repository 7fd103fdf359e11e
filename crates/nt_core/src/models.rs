use async_trait::async_trait;
use crate::Result;

#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Compress an article into a short summary related to `topic`
    async fn summarize(&self, text: &str, topic: &str) -> Result<String>;

    /// Synthesize a trend narrative from a digest of article summaries
    async fn analyze_trend(&self, digest: &str, topic: &str) -> Result<String>;

    /// Like [`summarize`](Self::summarize), but a failure is logged and
    /// reported as "no summary".
    async fn try_summarize(&self, text: &str, topic: &str) -> Option<String> {
        match self.summarize(text, topic).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("⚠️ {} could not summarize article for {}: {}", self.name(), topic, e);
                None
            }
        }
    }

    async fn try_analyze_trend(&self, digest: &str, topic: &str) -> Option<String> {
        match self.analyze_trend(digest, topic).await {
            Ok(trend) => Some(trend),
            Err(e) => {
                tracing::warn!("⚠️ {} could not analyze trend for {}: {}", self.name(), topic, e);
                None
            }
        }
    }
}
