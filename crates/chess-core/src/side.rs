use std::fmt;

use serde::Serialize;
use shakmaty::Color;

/// A player's colour as it is shown to people and sent in prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "White",
            Side::Black => "Black",
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Lenient parse for config and CLI input: "white", "W", "Black", ...
    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Side::White),
            "black" | "b" => Some(Side::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side() {
        assert_eq!(Side::parse("white"), Some(Side::White));
        assert_eq!(Side::parse(" Black "), Some(Side::Black));
        assert_eq!(Side::parse("b"), Some(Side::Black));
        assert_eq!(Side::parse("red"), None);
    }

    #[test]
    fn test_display_matches_prompt_wording() {
        assert_eq!(Side::White.to_string(), "White");
        assert_eq!(Side::Black.opponent(), Side::White);
        assert_eq!(Side::from(Color::Black), Side::Black);
    }
}
