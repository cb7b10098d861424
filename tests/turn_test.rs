mod common;

use std::time::Duration;

use chess_core::Side;
use common::{predicted, Reply, API_KEY, OPPONENT};
use mirrormate::clients::{GeminiClient, PredictionClient};
use mirrormate::{AnalysisStatus, TurnOrchestrator, TurnSettings};

type Orchestrator = TurnOrchestrator<PredictionClient, GeminiClient>;

async fn orchestrator(shared: &common::Shared, user_side: Side) -> Orchestrator {
    let url = common::serve(shared.clone()).await;
    TurnOrchestrator::new(
        PredictionClient::with_base_url(common::client(), &url),
        GeminiClient::with_base_url(common::client(), &url, "gemini-pro", API_KEY),
        TurnSettings {
            opponent: OPPONENT.to_string(),
            user_side,
            notice_ttl: Duration::from_secs(30),
        },
    )
}

#[tokio::test]
async fn test_full_turn_against_backend() {
    let shared = common::backend();
    common::script(&shared, "e4", predicted("e5", "persona_model"));
    let game = orchestrator(&shared, Side::White).await;

    assert!(game.attempt_user_move("e2", "e4", None));
    game.settle().await;

    let snapshot = game.snapshot();
    assert_eq!(snapshot.moves, vec!["e4", "e5"]);
    assert_eq!(snapshot.side_to_move, Side::White);
    assert!(snapshot.error.is_none());
    assert!(!snapshot.awaiting_reply);
    assert_eq!(snapshot.analysis_status, AnalysisStatus::Ready);
    assert_eq!(
        snapshot.analysis.as_deref(),
        Some("**Opening:** King's Pawn Game")
    );

    let backend = shared.lock().unwrap();
    assert_eq!(backend.requests, vec![(OPPONENT.to_string(), "e4".to_string())]);
    assert_eq!(backend.prompts.len(), 1);
    assert!(backend.prompts[0].0.contains("e4 e5"));
    assert!(backend.prompts[0].0.contains("I am playing White"));
}

#[tokio::test]
async fn test_illegal_user_move_never_reaches_backend() {
    let shared = common::backend();
    let game = orchestrator(&shared, Side::White).await;

    assert!(!game.attempt_user_move("e2", "e2", None));
    assert!(!game.attempt_user_move("e2", "e5", None));
    game.settle().await;

    assert!(game.snapshot().moves.is_empty());
    assert!(shared.lock().unwrap().requests.is_empty());
}

#[tokio::test]
async fn test_backend_failure_keeps_user_move() {
    let shared = common::backend();
    common::script(&shared, "e4", Reply::Status(500));
    let game = orchestrator(&shared, Side::White).await;

    assert!(game.attempt_user_move("e2", "e4", None));
    game.settle().await;

    let snapshot = game.snapshot();
    assert_eq!(snapshot.moves, vec!["e4"]);
    assert_eq!(snapshot.side_to_move, Side::Black);
    assert!(snapshot.analysis.is_none());
    let notice = snapshot.error.expect("Expected an error notice");
    assert!(notice.message.contains("500"), "message: {}", notice.message);
    assert!(shared.lock().unwrap().prompts.is_empty());
}

#[tokio::test]
async fn test_illegal_prediction_is_reported() {
    let shared = common::backend();
    common::script(&shared, "e4", predicted("Ke7", "persona_model"));
    let game = orchestrator(&shared, Side::White).await;

    assert!(game.attempt_user_move("e2", "e4", None));
    game.settle().await;

    let snapshot = game.snapshot();
    assert_eq!(snapshot.moves, vec!["e4"]);
    let notice = snapshot.error.expect("Expected an error notice");
    assert!(notice.message.contains("Ke7"), "message: {}", notice.message);

    // The board still belongs to whoever is on move; the next attempt clears
    // the notice.
    assert!(game.attempt_user_move("e7", "e5", None));
    game.settle().await;
    let snapshot = game.snapshot();
    assert_eq!(snapshot.moves, vec!["e4", "e5"]);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_uci_prediction_is_accepted() {
    let shared = common::backend();
    common::script(&shared, "e4", predicted("e7e5", "stockfish"));
    let game = orchestrator(&shared, Side::White).await;

    assert!(game.attempt_user_move("e2", "e4", None));
    game.settle().await;

    assert_eq!(game.snapshot().moves, vec!["e4", "e5"]);
}

#[tokio::test]
async fn test_persona_opens_when_user_is_black() {
    let shared = common::backend();
    common::script(&shared, "", predicted("d4", "persona_model"));
    common::script(&shared, "d4 Nf6", predicted("c4", "persona_model"));
    let game = orchestrator(&shared, Side::Black).await;

    assert!(game.begin());
    game.reply_settled().await;
    assert_eq!(game.snapshot().moves, vec!["d4"]);

    assert!(game.attempt_user_move("g8", "f6", None));
    game.settle().await;

    let snapshot = game.snapshot();
    assert_eq!(snapshot.moves, vec!["d4", "Nf6", "c4"]);
    assert_eq!(snapshot.side_to_move, Side::Black);
    let prompts = shared.lock().unwrap().prompts.clone();
    assert!(prompts.last().unwrap().0.contains("I am playing Black"));
}
