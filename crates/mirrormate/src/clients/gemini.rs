//! Gemini `generateContent` client used for move analysis.

use chess_core::Side;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{http_client, GameAnalyst};
use crate::config::Config;
use crate::error::ClientError;
use crate::prompt;

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self::with_base_url(
            http_client(config.http_timeout)?,
            &config.gemini_base_url,
            &config.gemini_model,
            &config.gemini_api_key,
        ))
    }

    pub fn with_base_url(client: Client, base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_start_matches("models/").to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Send one prompt and return the trimmed text of the first candidate.
    pub async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "safetySettings": [
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
            ],
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "Requesting analysis");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClientError::Status {
                endpoint: "generateContent",
                status: resp.status(),
            });
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("generateContent JSON: {e}")))?;

        extract_text(parsed)
    }
}

impl GameAnalyst for GeminiClient {
    async fn analyze(&self, history: &str, side: Side) -> Result<String, ClientError> {
        let prompt = prompt::move_analysis(history, side);
        self.generate(&prompt).await
    }
}

fn extract_text(resp: GenerateResponse) -> Result<String, ClientError> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ClientError::Blocked(reason));
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return Err(ClientError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();

    if text.is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some("SAFETY") => Err(ClientError::Blocked("SAFETY".to_string())),
            _ => Err(ClientError::EmptyResponse),
        };
    }

    Ok(text.to_string())
}
