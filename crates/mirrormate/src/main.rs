use chess_core::pgn::{self, PgnHeaders};
use chess_core::{MoveHistory, Side};
use mirrormate::clients::{GeminiClient, PersonaClient, PersonaStatus, PredictionClient};
use mirrormate::command::Command;
use mirrormate::config::Config;
use mirrormate::{GameSnapshot, TurnOrchestrator, TurnSettings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    tracing::info!(opponent = %config.opponent, "Checking persona...");
    let persona = PersonaClient::new(&config)?;
    if let PersonaStatus::NotReady(status) = persona.status(&config.opponent).await? {
        anyhow::bail!(
            "Persona for {} is not ready (status {status:?})",
            config.opponent
        );
    }

    let orchestrator = TurnOrchestrator::new(
        PredictionClient::new(&config)?,
        GeminiClient::new(&config)?,
        TurnSettings {
            opponent: config.opponent.clone(),
            user_side: config.user_side,
            notice_ttl: config.notice_ttl,
        },
    );

    let mut updates = orchestrator.subscribe();
    tokio::spawn(async move {
        let mut last = updates.borrow().clone();
        while updates.changed().await.is_ok() {
            let current = updates.borrow_and_update().clone();
            report(&last, &current);
            last = current;
        }
    });

    println!(
        "Playing {} against the {} persona. Type `help` for commands.",
        config.user_side, config.opponent
    );

    if orchestrator.begin() {
        orchestrator.reply_settled().await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::parse(&line) else {
            println!("Unrecognized input: {line}");
            continue;
        };

        match command {
            Command::Move { from, to, promotion } => {
                if orchestrator.attempt_user_move(&from, &to, promotion.as_deref()) {
                    // No new input until the reply is on the board.
                    orchestrator.reply_settled().await;
                } else {
                    println!("Move {from}{to} rejected");
                }
            }
            Command::Dismiss => orchestrator.dismiss_error(),
            Command::Fen => println!("{}", orchestrator.snapshot().fen),
            Command::Pgn => println!("{}", render_pgn(&config, &orchestrator.snapshot())),
            Command::State => {
                println!("{}", serde_json::to_string_pretty(&orchestrator.snapshot())?)
            }
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }

    orchestrator.settle().await;
    Ok(())
}

/// Print what changed between two snapshots.
fn report(last: &GameSnapshot, current: &GameSnapshot) {
    for (index, san) in current.moves.iter().enumerate().skip(last.moves.len()) {
        let who = if MoveHistory::mover(index) == current.user_side {
            "you"
        } else {
            "persona"
        };
        let dots = if index % 2 == 0 { "." } else { "..." };
        println!("{}{dots} {san}  ({who})", index / 2 + 1);
    }

    if current.status != last.status && current.status.is_terminal() {
        println!("Game over: {:?}", current.status);
    }

    if current.analysis != last.analysis {
        if let Some(text) = &current.analysis {
            println!("\n--- Analysis ---\n{text}\n");
        }
    }

    if let Some(notice) = &current.error {
        if last.error.as_ref().map(|n| n.id) != Some(notice.id) {
            println!("! {}", notice.message);
        }
    }
}

fn render_pgn(config: &Config, snapshot: &GameSnapshot) -> String {
    let (white, black) = match config.user_side {
        Side::White => ("You".to_string(), config.opponent.clone()),
        Side::Black => (config.opponent.clone(), "You".to_string()),
    };
    let headers = PgnHeaders {
        event: "mirrormate persona game".to_string(),
        date: chrono::Local::now().date_naive(),
        white,
        black,
        result: pgn::result_token(snapshot.status).to_string(),
    };
    pgn::render(&headers, &snapshot.moves)
}

fn print_help() {
    println!("Moves: e2e4, g1-f3, e7e8q (promotion letter optional, queen by default)");
    println!("Commands: fen, pgn, state, dismiss, help, quit");
}
