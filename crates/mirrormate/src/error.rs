use reqwest::StatusCode;

/// Failure talking to the persona backend or the LLM.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Analysis blocked: {0}")]
    Blocked(String),

    #[error("Analysis response was empty")]
    EmptyResponse,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// A failed step of a turn. Its message becomes the pending notice.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Opponent replied with an illegal move: {0}")]
    IllegalPrediction(String),

    #[error("Move prediction failed: {0}")]
    Prediction(#[source] ClientError),

    #[error("Analysis failed: {0}")]
    Analysis(#[source] ClientError),
}
