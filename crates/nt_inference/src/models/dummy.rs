use std::fmt;
use nt_core::Result;
use super::InferenceModel;

const SUMMARY_WORDS: usize = 20;

/// Offline model: summaries are the leading words of the text and trends
/// are one bullet per digest entry.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, text: &str, _topic: &str) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().take(SUMMARY_WORDS).collect();
        Ok(words.join(" "))
    }

    async fn analyze_trend(&self, digest: &str, topic: &str) -> Result<String> {
        let bullets: Vec<String> = digest
            .split("\n\n")
            .filter_map(|entry| entry.lines().next())
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!("- {}", line.trim()))
            .collect();
        if bullets.is_empty() {
            return Ok(format!("No recent coverage of {}.", topic));
        }
        Ok(format!("Trend of {}:\n{}", topic, bullets.join("\n")))
    }
}
