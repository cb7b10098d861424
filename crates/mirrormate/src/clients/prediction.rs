use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, MovePredictor};
use crate::config::Config;
use crate::error::ClientError;

/// A move proposed by the persona backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    /// SAN, or UCI when the backend fell back to its engine
    pub notation: String,
    /// Where the backend got it from: "cache", "model" or "stockfish"
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NextMoveResponse {
    predicted_move: Option<String>,
    source: Option<String>,
}

pub struct PredictionClient {
    client: Client,
    api_url: String,
}

impl PredictionClient {
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

    /// Ask the backend for the persona's reply to `history`.
    pub async fn next_move(
        &self,
        history: &[String],
        opponent: &str,
    ) -> Result<Option<Prediction>, ClientError> {
        let url = format!("{}/train/next-move/", self.api_url);
        let partial_sequence = history.join(" ");

        debug!(opponent, partial_sequence = %partial_sequence, "Requesting next move");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("lichess_username", opponent),
                ("partial_sequence", partial_sequence.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ClientError::Status {
                endpoint: "next-move",
                status: resp.status(),
            });
        }

        let body = resp.text().await?;
        parse_next_move(&body)
    }
}

impl MovePredictor for PredictionClient {
    async fn predict(
        &self,
        history: &[String],
        opponent: &str,
    ) -> Result<Option<Prediction>, ClientError> {
        self.next_move(history, opponent).await
    }
}

/// The backend answers `{"predicted_move": ..., "source": ...}`, or `null`
/// when none of its strategies produced a move.
fn parse_next_move(body: &str) -> Result<Option<Prediction>, ClientError> {
    let parsed: Option<NextMoveResponse> = serde_json::from_str(body)
        .map_err(|e| ClientError::Decode(format!("next-move JSON: {e}")))?;

    Ok(parsed.and_then(|resp| {
        let notation = resp.predicted_move?.trim().to_string();
        if notation.is_empty() {
            return None;
        }
        Some(Prediction {
            notation,
            source: resp.source,
        })
    }))
}
