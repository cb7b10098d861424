//! Prompt sent to the analysis model.

use chess_core::Side;

/// Build the play-style analysis prompt for `moves` (space-joined SAN) from
/// the point of view of the human playing `side`.
pub fn move_analysis(moves: &str, side: Side) -> String {
    let opponent = side.opponent();
    // White's opponent moves second; Black's moves first.
    let first_opponent_move = match side {
        Side::White => "second",
        Side::Black => "first",
    };

    format!(
        "Moves played so far, in SAN: {moves}

You are a chess grandmaster coaching me. I want to understand how my opponent plays.
I am playing {side}. Starting from the {first_opponent_move} move, every other move belongs to my opponent ({opponent}).
Write a short analysis that helps me beat this opponent by answering:

- Which opening is being played?
- Which side of the board is the opponent trying to attack?
- What is the opponent's play style?

Format the answer as GitHub Flavored Markdown. Use richly formatted bullet points instead of tables, and back claims with percentages and numbers.
Do not recommend any moves.
Do not add notes or disclaimers.
"
    )
}
