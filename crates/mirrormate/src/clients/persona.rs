//! Persona readiness check, run once before a game starts.

use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use super::http_client;
use crate::config::Config;
use crate::error::ClientError;

const CLONING_COMPLETE: &str = "CLONING_COMPLETE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaStatus {
    Ready,
    /// Anything other than a finished clone; carries the raw status.
    NotReady(String),
}

#[derive(Debug, Deserialize)]
struct PersonaResponse {
    status: Option<String>,
}

pub struct PersonaClient {
    client: Client,
    api_url: String,
}

impl PersonaClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Ok(Self::with_base_url(
            http_client(config.http_timeout)?,
            &config.api_url,
        ))
    }

    pub fn with_base_url(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Ask the backend whether the persona for `username` is ready. The
    /// backend builds the persona on first request, so this can be slow.
    pub async fn status(&self, username: &str) -> Result<PersonaStatus, ClientError> {
        let url = format!("{}/train/persona/{}", self.api_url, username);

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::Status {
                endpoint: "persona",
                status: resp.status(),
            });
        }

        let body: PersonaResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("persona JSON: {e}")))?;

        let status = match body.status {
            Some(s) if s == CLONING_COMPLETE => PersonaStatus::Ready,
            Some(s) => PersonaStatus::NotReady(s),
            None => PersonaStatus::NotReady(String::new()),
        };

        info!(username, ?status, "Persona status");
        Ok(status)
    }
}
