use std::env;
use std::time::Duration;

use chess_core::Side;

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug)]
pub struct Config {
    /// Persona backend base URL (prediction + persona status)
    pub api_url: String,
    /// Lichess username of the opponent being imitated
    pub opponent: String,
    /// Colour the human plays
    pub user_side: Side,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// Transport timeout for every HTTP client
    pub http_timeout: Duration,
    /// How long an error notice stays up before it is dismissed
    pub notice_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source. `from_env` is this over the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let opponent = required("OPPONENT_USERNAME")?.trim().to_string();
        let gemini_api_key = required("GEMINI_API_KEY")?;

        let user_side = match lookup("USER_SIDE") {
            Some(value) => Side::parse(&value).ok_or(ConfigError::Invalid {
                name: "USER_SIDE",
                value,
            })?,
            None => Side::White,
        };

        let secs = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(key) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::Invalid { name: key, value }),
                None => Ok(Duration::from_secs(default)),
            }
        };

        Ok(Self {
            api_url: trim_url(lookup("MIRRORMATE_API_URL"), DEFAULT_API_URL),
            opponent,
            user_side,
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-pro".to_string()),
            gemini_base_url: trim_url(lookup("GEMINI_BASE_URL"), DEFAULT_GEMINI_BASE_URL),
            http_timeout: secs("HTTP_TIMEOUT_SECS", 120)?,
            notice_ttl: secs("NOTICE_TTL_SECS", 5)?,
        })
    }
}

fn trim_url(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
