pub mod models;
pub mod trend;

/// Selects and configures the summarization model.
#[derive(Clone)]
pub struct Config {
    /// `openai` or `dummy`
    pub provider: String,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            api_key: None,
            model_name: None,
            base_url: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::models::create_model;
    pub use super::trend::format_articles_for_prompt;
    pub use nt_core::{InferenceModel, Result, Error};
}

pub use models::create_model;
pub use trend::format_articles_for_prompt;
