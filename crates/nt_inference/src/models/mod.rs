use std::sync::Arc;
use nt_core::{Error, Result};
use crate::Config;

pub mod dummy;
pub mod openai;

pub use nt_core::InferenceModel;
pub use dummy::DummyModel;
pub use openai::OpenAiModel;

/// Builds the summarization model named by `config.provider`.
pub fn create_model(config: &Config) -> Result<Arc<dyn InferenceModel>> {
    match config.provider.to_ascii_lowercase().as_str() {
        "openai" => {
            if config.api_key.is_none() {
                tracing::warn!("⚠️ OpenAI API key is missing, articles will be stored without summaries");
            }
            let mut model = OpenAiModel::new(config.api_key.clone());
            if let Some(base_url) = &config.base_url {
                model = model.with_base_url(base_url.clone());
            }
            if let Some(model_name) = &config.model_name {
                model = model.with_model_name(model_name.clone());
            }
            Ok(Arc::new(model))
        }
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::InvalidInput(format!(
            "Unknown model: {}. Available models: openai (default), dummy",
            other
        ))),
    }
}
