//! HTTP clients for the persona backend and the analysis model, and the
//! traits the orchestrator drives them through.

use std::future::Future;
use std::time::Duration;

use chess_core::Side;
use reqwest::Client;

use crate::error::ClientError;

pub mod gemini;
pub mod persona;
pub mod prediction;

pub use gemini::GeminiClient;
pub use persona::{PersonaClient, PersonaStatus};
pub use prediction::{Prediction, PredictionClient};

/// Something that can propose the opponent's next move.
pub trait MovePredictor: Send + Sync + 'static {
    /// `Ok(None)` means the persona has nothing to play; it is not an error.
    fn predict(
        &self,
        history: &[String],
        opponent: &str,
    ) -> impl Future<Output = Result<Option<Prediction>, ClientError>> + Send;
}

/// Something that can describe the opponent's play from the moves so far.
pub trait GameAnalyst: Send + Sync + 'static {
    fn analyze(
        &self,
        history: &str,
        side: Side,
    ) -> impl Future<Output = Result<String, ClientError>> + Send;
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, ClientError> {
    let client = Client::builder()
        .user_agent("mirrormate/0.1")
        .timeout(timeout)
        .build()?;
    Ok(client)
}
