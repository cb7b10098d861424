//! Promotion choice coming from the board widget.

use shakmaty::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromotionPiece {
    #[default]
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Map a widget piece code to a promotion piece.
    ///
    /// Widget codes are colour + role (`"wQ"`, `"bN"`); a bare role letter
    /// (`"q"`, `"N"`) is accepted too. Anything else, including a missing
    /// hint or a pawn/king code, falls back to a queen.
    pub fn from_piece_code(code: Option<&str>) -> Self {
        let Some(code) = code.map(str::trim) else {
            return PromotionPiece::Queen;
        };

        let mut chars = code.chars();
        let letter = match (chars.next(), chars.next(), chars.next()) {
            (Some(c), None, None) => Some(c),
            (Some('w' | 'b'), Some(c), None) => Some(c),
            _ => None,
        };

        match letter.map(|c| c.to_ascii_lowercase()) {
            Some('r') => PromotionPiece::Rook,
            Some('b') => PromotionPiece::Bishop,
            Some('n') => PromotionPiece::Knight,
            _ => PromotionPiece::Queen,
        }
    }

    pub fn role(self) -> Role {
        match self {
            PromotionPiece::Queen => Role::Queen,
            PromotionPiece::Rook => Role::Rook,
            PromotionPiece::Bishop => Role::Bishop,
            PromotionPiece::Knight => Role::Knight,
        }
    }
}
