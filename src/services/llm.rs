/// Minimal client for Groq's OpenAI-compatible chat completion endpoint
///
/// Both the mood interpreter and the content generator only need one thing from the model:
/// a JSON object answer to a single prompt.
use crate::{
    error::{AppError, AppResult},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat},
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct GroqClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: String, api_url: String, model: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Sends a prompt in JSON mode and parses the first choice as a JSON document
    pub async fn complete_json(
        &self,
        messages: Vec<ChatMessage>,
    ) -> AppResult<serde_json::Value> {
        let url = format!("{}/chat/completions", self.api_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            response_format: ResponseFormat::json_object(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Groq API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ExternalApi("Groq response had no content".to_string()))?;

        tracing::debug!(model = %self.model, content = %content, "Groq completion received");

        serde_json::from_str(&content).map_err(|e| {
            AppError::ExternalApi(format!("Groq returned invalid JSON content: {}", e))
        })
    }
}
