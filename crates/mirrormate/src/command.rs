//! Terminal input parsing for the `mirrormate` binary.

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A drag from `from` to `to`; `promotion` is a piece letter if given.
    Move {
        from: String,
        to: String,
        promotion: Option<String>,
    },
    Dismiss,
    Fen,
    Pgn,
    /// Dump the whole snapshot as JSON
    State,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Moves are square pairs: `e2e4`, `e2-e4`,
    /// `e2 e4`, with an optional promotion letter (`e7e8q`, `e7e8=N`).
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "dismiss" | "d" => return Some(Command::Dismiss),
            "fen" => return Some(Command::Fen),
            "pgn" => return Some(Command::Pgn),
            "state" | "json" => return Some(Command::State),
            "help" | "?" => return Some(Command::Help),
            "quit" | "exit" | "q" => return Some(Command::Quit),
            _ => {}
        }

        let move_re =
            Regex::new(r"^([a-hA-H][1-8])\s*[-x ]?\s*([a-hA-H][1-8])\s*=?\s*([qrbnQRBN])?$").ok()?;
        let caps = move_re.captures(line)?;

        Some(Command::Move {
            from: caps[1].to_ascii_lowercase(),
            to: caps[2].to_ascii_lowercase(),
            promotion: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }
}
