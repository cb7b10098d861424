//! PGN rendering for a finished or in-progress session.

use chrono::NaiveDate;

use crate::rules::GameStatus;
use crate::side::Side;

/// Seven-tag-roster subset written at the top of an exported game.
#[derive(Debug, Clone)]
pub struct PgnHeaders {
    pub event: String,
    pub date: NaiveDate,
    pub white: String,
    pub black: String,
    pub result: String,
}

/// PGN result token for a status. Unfinished games are `*`.
pub fn result_token(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Checkmate { winner: Side::White } => "1-0",
        GameStatus::Checkmate { winner: Side::Black } => "0-1",
        GameStatus::Draw(_) => "1/2-1/2",
        GameStatus::Ongoing | GameStatus::Check => "*",
    }
}

/// Numbered movetext, e.g. `["e4", "e5", "Nf3"]` → `"1. e4 e5 2. Nf3"`.
pub fn movetext<S: AsRef<str>>(moves: &[S]) -> String {
    let mut out = String::new();
    for (ply, san) in moves.iter().enumerate() {
        if ply % 2 == 0 {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&format!("{}. {}", ply / 2 + 1, san.as_ref()));
        } else {
            out.push(' ');
            out.push_str(san.as_ref());
        }
    }
    out
}

/// Full PGN: header block, blank line, movetext followed by the result.
pub fn render<S: AsRef<str>>(headers: &PgnHeaders, moves: &[S]) -> String {
    let mut out = String::new();
    for (key, value) in [
        ("Event", headers.event.clone()),
        ("Site", "mirrormate".to_string()),
        ("Date", headers.date.format("%Y.%m.%d").to_string()),
        ("White", headers.white.clone()),
        ("Black", headers.black.clone()),
        ("Result", headers.result.clone()),
    ] {
        out.push_str(&format!("[{key} \"{}\"]\n", value.replace('"', "'")));
    }
    out.push('\n');

    let text = movetext(moves);
    if text.is_empty() {
        out.push_str(&headers.result);
    } else {
        out.push_str(&format!("{text} {}", headers.result));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DrawReason;

    #[test]
    fn test_movetext_numbering() {
        assert_eq!(movetext::<&str>(&[]), "");
        assert_eq!(movetext(&["e4"]), "1. e4");
        assert_eq!(movetext(&["e4", "e5", "Nf3"]), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_result_tokens() {
        assert_eq!(result_token(GameStatus::Checkmate { winner: Side::White }), "1-0");
        assert_eq!(result_token(GameStatus::Checkmate { winner: Side::Black }), "0-1");
        assert_eq!(result_token(GameStatus::Draw(DrawReason::Stalemate)), "1/2-1/2");
        assert_eq!(result_token(GameStatus::Check), "*");
    }

    #[test]
    fn test_render_pgn() {
        let headers = PgnHeaders {
            event: "Persona game".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            white: "me".to_string(),
            black: "rootsec1".to_string(),
            result: "*".to_string(),
        };

        let pgn = render(&headers, &["e4", "e5"]);
        assert!(pgn.contains("[Date \"2025.01.15\"]"));
        assert!(pgn.contains("[Black \"rootsec1\"]"));
        assert!(pgn.ends_with("1. e4 e5 *\n"));
    }
}
