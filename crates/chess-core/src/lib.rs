//! Chess primitives shared by the mirrormate crates: the rules adapter over
//! `shakmaty`, the append-only move history, and PGN rendering.

pub mod history;
pub mod pgn;
pub mod promotion;
pub mod rules;
pub mod side;

pub use history::MoveHistory;
pub use promotion::PromotionPiece;
pub use rules::{AppliedMove, DrawReason, GameStatus, ReplayError, RulesEngine};
pub use side::Side;
