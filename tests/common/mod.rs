//! In-process stand-ins for the persona backend and the Gemini API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::{json, Value};

pub const OPPONENT: &str = "rootsec1";
pub const API_KEY: &str = "test-key";

/// What the mock backend answers for a given `partial_sequence`.
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

#[derive(Default)]
pub struct Backend {
    /// Keyed by `partial_sequence`; anything unscripted answers `null`.
    pub replies: HashMap<String, Reply>,
    /// `(lichess_username, partial_sequence)` of every next-move call
    pub requests: Vec<(String, String)>,
    /// Prompt text and API key of every generateContent call
    pub prompts: Vec<(String, String)>,
    pub analysis_text: String,
    pub analysis_status: Option<u16>,
}

pub type Shared = Arc<Mutex<Backend>>;

pub fn backend() -> Shared {
    Arc::new(Mutex::new(Backend {
        analysis_text: "  **Opening:** King's Pawn Game\n\n".to_string(),
        ..Default::default()
    }))
}

pub fn script(shared: &Shared, sequence: &str, reply: Reply) {
    shared
        .lock()
        .unwrap()
        .replies
        .insert(sequence.to_string(), reply);
}

pub fn predicted(notation: &str, source: &str) -> Reply {
    Reply::Json(json!({ "predicted_move": notation, "source": source }))
}

async fn next_move(
    Extension(shared): Extension<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let username = params.get("lichess_username").cloned().unwrap_or_default();
    let sequence = params.get("partial_sequence").cloned().unwrap_or_default();

    let mut backend = shared.lock().unwrap();
    backend.requests.push((username, sequence.clone()));
    match backend.replies.get(&sequence).cloned() {
        Some(Reply::Json(body)) => Json(body).into_response(),
        Some(Reply::Status(code)) => StatusCode::from_u16(code).unwrap().into_response(),
        None => Json(Value::Null).into_response(),
    }
}

async fn persona(Path(username): Path<String>) -> Json<Value> {
    let status = if username == OPPONENT {
        "CLONING_COMPLETE"
    } else {
        "CLONING_IN_PROGRESS"
    };
    Json(json!({ "status": status }))
}

async fn generate_content(
    Extension(shared): Extension<Shared>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    assert!(call.ends_with(":generateContent"), "unexpected call {call}");

    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut backend = shared.lock().unwrap();
    backend.prompts.push((prompt, key));
    if let Some(code) = backend.analysis_status {
        return StatusCode::from_u16(code).unwrap().into_response();
    }

    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": backend.analysis_text }] },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

pub fn router(shared: Shared) -> Router {
    Router::new()
        .route("/train/next-move/", get(next_move))
        .route("/train/persona/{username}", get(persona))
        .route("/v1beta/models/{call}", post(generate_content))
        .layer(Extension(shared))
}

/// Serve `shared` on an ephemeral port and return its base URL.
pub async fn serve(shared: Shared) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().unwrap();
    let app = router(shared);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// A reqwest client with a short timeout for tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
