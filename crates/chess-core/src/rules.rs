//! Rules adapter over `shakmaty`.
//!
//! `RulesEngine` is the only place that knows about legality. Every move goes
//! through [`RulesEngine::apply_move`] or [`RulesEngine::apply_notation`]; both
//! return `None` for an illegal move and leave the position untouched in that
//! case.

use serde::Serialize;
use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Move, Piece,
    Position, Rank, Role, Square,
};

use crate::promotion::PromotionPiece;
use crate::side::Side;

/// A move the engine accepted, in both notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// SAN with check/mate suffix, e.g. `"Qh4#"`.
    pub san: String,
    /// UCI, e.g. `"d8h4"`.
    pub uci: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoves,
    Repetition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate { winner: Side },
    Draw(DrawReason),
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Draw(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Move {index} ({notation}) is not legal")]
    Illegal { index: usize, notation: String },
}

#[derive(Debug, Clone)]
pub struct RulesEngine {
    position: Chess,
    /// Placement/side/castling/ep of every position reached, for repetition.
    seen: Vec<String>,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine {
    /// Engine at the standard starting position.
    pub fn new() -> Self {
        let position = Chess::default();
        let seen = vec![repetition_key(&position)];
        Self { position, seen }
    }

    /// Rebuild a position by playing `moves` (SAN or UCI) from the start.
    pub fn replay<S: AsRef<str>>(moves: &[S]) -> Result<Self, ReplayError> {
        let mut engine = Self::new();
        for (index, notation) in moves.iter().enumerate() {
            let notation = notation.as_ref();
            if engine.apply_notation(notation).is_none() {
                return Err(ReplayError::Illegal {
                    index,
                    notation: notation.to_string(),
                });
            }
        }
        Ok(engine)
    }

    /// Apply a move given as board squares, as a drag-and-drop produces it.
    ///
    /// `promotion` is only consulted when a pawn reaches the last rank.
    /// Castling is given as the king's two-square step (`e1` → `g1`).
    pub fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: PromotionPiece,
    ) -> Option<AppliedMove> {
        let promotion = self.is_promotion(from, to).then(|| promotion.role());
        let uci = UciMove::Normal { from, to, promotion };
        let mv = uci.to_move(&self.position).ok()?;
        Some(self.commit(mv))
    }

    /// Apply a move given as text. SAN is tried first, then UCI, since the
    /// prediction backend answers in either depending on its source. Loose
    /// SAN such as `0-0` or `hxg8Q` is accepted.
    pub fn apply_notation(&mut self, notation: &str) -> Option<AppliedMove> {
        let notation = notation.trim();
        if notation.is_empty() {
            return None;
        }

        let from_san = normalize_san(notation)
            .parse::<SanPlus>()
            .ok()
            .and_then(|san_plus| san_plus.san.to_move(&self.position).ok());

        let mv = match from_san {
            Some(mv) => mv,
            None => notation
                .parse::<UciMove>()
                .ok()?
                .to_move(&self.position)
                .ok()?,
        };

        Some(self.commit(mv))
    }

    fn commit(&mut self, mv: Move) -> AppliedMove {
        let uci = mv.to_uci(CastlingMode::Standard).to_string();
        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, mv).to_string();
        self.seen.push(repetition_key(&self.position));
        AppliedMove { san, uci }
    }

    fn is_promotion(&self, from: Square, to: Square) -> bool {
        match self.position.board().piece_at(from) {
            Some(Piece { role: Role::Pawn, color: Color::White }) => to.rank() == Rank::Eighth,
            Some(Piece { role: Role::Pawn, color: Color::Black }) => to.rank() == Rank::First,
            _ => false,
        }
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_draw(&self) -> bool {
        self.draw_reason().is_some()
    }

    /// Checkmate or any kind of draw.
    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    pub fn draw_reason(&self) -> Option<DrawReason> {
        if self.position.is_stalemate() {
            Some(DrawReason::Stalemate)
        } else if self.position.is_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else if self.position.halfmoves() >= 100 {
            Some(DrawReason::FiftyMoves)
        } else if self.is_threefold_repetition() {
            Some(DrawReason::Repetition)
        } else {
            None
        }
    }

    fn is_threefold_repetition(&self) -> bool {
        match self.seen.last() {
            Some(current) => self.seen.iter().filter(|key| *key == current).count() >= 3,
            None => false,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.is_checkmate() {
            // The side to move is the one that got mated.
            GameStatus::Checkmate {
                winner: self.turn().opponent(),
            }
        } else if let Some(reason) = self.draw_reason() {
            GameStatus::Draw(reason)
        } else if self.is_check() {
            GameStatus::Check
        } else {
            GameStatus::Ongoing
        }
    }

    pub fn turn(&self) -> Side {
        self.position.turn().into()
    }

    /// Current position as FEN.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }
}

/// Rewrite common SAN variants into the strict form: castling written with
/// zeros, and promotions missing their `=`.
fn normalize_san(notation: &str) -> String {
    let body = notation.trim_end_matches(['+', '#']);
    let suffix = &notation[body.len()..];

    let mut body = match body {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        other => other.to_string(),
    };

    let bytes = body.as_bytes();
    let n = bytes.len();
    if n >= 3
        && matches!(bytes[n - 1], b'Q' | b'R' | b'B' | b'N')
        && matches!(bytes[n - 2], b'1' | b'8')
    {
        body.insert(n - 1, '=');
    }

    body.push_str(suffix);
    body
}

/// FEN without the move counters.
fn repetition_key(position: &Chess) -> String {
    let fen = Fen::from_position(position, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}
