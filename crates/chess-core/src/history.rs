use crate::side::Side;

/// Append-only list of SAN moves, in the order they were played.
///
/// There is no way to remove or rewrite an entry; the only mutation is
/// [`MoveHistory::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveHistory {
    moves: Vec<String>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, san: impl Into<String>) {
        self.moves.push(san.into());
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Side that played the ply at `index`. Games always start from the
    /// standard position, so even plies are White's.
    pub fn mover(index: usize) -> Side {
        if index % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Space-joined, trimmed SAN: the form sent to the prediction backend
    /// and the analysis prompt.
    pub fn joined(&self) -> String {
        self.moves.join(" ").trim().to_string()
    }
}
