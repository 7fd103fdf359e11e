use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use nt_core::{Error, Result};
use std::fmt;
use super::InferenceModel;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";
const TEMPERATURE: f32 = 0.5;
const PROVIDER: &str = "OpenAI";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn summary_instruction(topic: &str) -> String {
    format!(
        "You will be provided with a news article. Your goal is to extract a summary of 3 sentences. The summary should be related to {}.",
        topic
    )
}

fn trend_instruction(topic: &str) -> String {
    format!(
        "You are a trend analyst. Your goal is to summary the trend of {topic} based on the date and content. The summary is about the trend of {topic} and in clear bullet points.",
        topic = topic
    )
}

pub struct OpenAiModel {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model_name: String,
}

impl OpenAiModel {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    async fn complete(&self, instruction: &str, input: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(Error::CredentialMissing(PROVIDER))?;

        let request = ChatRequest {
            model: &self.model_name,
            messages: vec![
                ChatMessage { role: "system", content: instruction },
                ChatMessage { role: "user", content: input },
            ],
            temperature: TEMPERATURE,
        };

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => status.to_string(),
            };
            return Err(Error::provider(PROVIDER, format!("{} ({})", message, status.as_u16())));
        }

        let response = response.json::<ChatResponse>().await?;
        response.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::provider(PROVIDER, "response contained no completion"))
    }
}

impl fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model_name", &self.model_name)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for OpenAiModel {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn summarize(&self, text: &str, topic: &str) -> Result<String> {
        self.complete(&summary_instruction(topic), text).await
    }

    async fn analyze_trend(&self, digest: &str, topic: &str) -> Result<String> {
        self.complete(&trend_instruction(topic), digest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    async fn completions(State(captured): State<Captured>, Json(body): Json<Value>) -> Json<Value> {
        captured.lock().unwrap().push(body);
        Json(json!({"choices": [{"message": {"role": "assistant", "content": "A short summary."}}]}))
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        // Nothing listens on port 1, so a request would fail with an HTTP error
        let model = OpenAiModel::new(None).with_base_url("http://127.0.0.1:1");
        let err = model.summarize("text", "tech").await.unwrap_err();
        assert!(matches!(err, Error::CredentialMissing("OpenAI")));
        assert!(model.try_summarize("text", "tech").await.is_none());

        let model = OpenAiModel::new(Some(String::new())).with_base_url("http://127.0.0.1:1");
        assert!(matches!(model.analyze_trend("digest", "tech").await, Err(Error::CredentialMissing(_))));
    }

    #[tokio::test]
    async fn test_summarize_sends_topic_instruction() {
        let captured = Captured::default();
        let router = Router::new()
            .route("/chat/completions", post(completions))
            .with_state(captured.clone());
        let model = OpenAiModel::new(Some("sk-test".to_string())).with_base_url(serve(router).await);

        let summary = model.summarize("Article body", "Rust").await.unwrap();
        assert_eq!(summary, "A short summary.");

        let trend = model.analyze_trend("[2024-01-01] Title", "Rust").await.unwrap();
        assert_eq!(trend, "A short summary.");

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["model"], DEFAULT_MODEL);
        assert_eq!(requests[0]["temperature"], 0.5);
        assert_eq!(requests[0]["messages"][0]["role"], "system");
        assert!(requests[0]["messages"][0]["content"].as_str().unwrap().ends_with("related to Rust."));
        assert_eq!(requests[0]["messages"][1]["content"], "Article body");
        assert!(requests[1]["messages"][0]["content"].as_str().unwrap().contains("trend of Rust"));
    }

    #[tokio::test]
    async fn test_provider_error_degrades_to_none() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": {"message": "Rate limit reached"}})),
                )
            }),
        );
        let model = OpenAiModel::new(Some("sk-test".to_string())).with_base_url(serve(router).await);

        match model.summarize("text", "tech").await {
            Err(Error::Provider { message, .. }) => assert!(message.contains("Rate limit reached")),
            other => panic!("expected provider error, got {:?}", other.map(|_| ())),
        }
        assert!(model.try_summarize("text", "tech").await.is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = OpenAiModel::new(Some("sk-secret".to_string()));
        assert!(!format!("{:?}", model).contains("sk-secret"));
    }
}
