//! Game state owned by the turn orchestrator, and the read-only snapshot it
//! publishes.

use chess_core::{GameStatus, MoveHistory, RulesEngine, Side};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalysisStatus {
    /// Nothing requested yet, or the last turn ended without a request.
    Idle,
    InProgress,
    Ready,
    Failed,
}

/// A user-visible error. `id` distinguishes a re-raised identical message
/// from the one a dismissal timer was started for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Everything the presentation layer may read about the game.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub fen: String,
    pub moves: Vec<String>,
    pub side_to_move: Side,
    pub user_side: Side,
    pub status: GameStatus,
    pub analysis: Option<String>,
    pub analysis_status: AnalysisStatus,
    pub error: Option<Notice>,
    /// A user move was accepted and the persona's reply has not landed yet.
    pub awaiting_reply: bool,
}

pub(crate) struct GameState {
    engine: RulesEngine,
    history: MoveHistory,
    user_side: Side,
    analysis: Option<String>,
    analysis_status: AnalysisStatus,
    error: Option<Notice>,
    awaiting_reply: bool,
    next_notice_id: u64,
    /// Sequence number of the newest analysis request issued.
    analysis_issued: u64,
    /// Sequence number of the newest analysis response applied.
    analysis_applied: u64,
}

impl GameState {
    pub(crate) fn new(user_side: Side) -> Self {
        Self {
            engine: RulesEngine::new(),
            history: MoveHistory::new(),
            user_side,
            analysis: None,
            analysis_status: AnalysisStatus::Idle,
            error: None,
            awaiting_reply: false,
            next_notice_id: 0,
            analysis_issued: 0,
            analysis_applied: 0,
        }
    }

    pub(crate) fn engine(&self) -> &RulesEngine {
        &self.engine
    }

    pub(crate) fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub(crate) fn user_side(&self) -> Side {
        self.user_side
    }

    /// The only way a move reaches the game: `engine` must be the current
    /// engine with exactly the move `san` applied to it.
    pub(crate) fn commit(&mut self, engine: RulesEngine, san: String) {
        self.engine = engine;
        self.history.push(san);
    }

    pub(crate) fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub(crate) fn mark_analysis_pending(&mut self) {
        self.analysis_status = AnalysisStatus::InProgress;
    }

    /// Drop the "in progress" placeholder when a turn ends without asking
    /// for analysis.
    pub(crate) fn settle_analysis_placeholder(&mut self) {
        if self.analysis_status == AnalysisStatus::InProgress && !self.analysis_outstanding() {
            self.analysis_status = match self.analysis {
                Some(_) => AnalysisStatus::Ready,
                None => AnalysisStatus::Idle,
            };
        }
    }

    fn analysis_outstanding(&self) -> bool {
        self.analysis_issued > self.analysis_applied
    }

    /// Register a new analysis request and return its sequence number.
    pub(crate) fn begin_analysis(&mut self) -> u64 {
        self.analysis_issued += 1;
        self.analysis_status = AnalysisStatus::InProgress;
        self.analysis_issued
    }

    /// Store an analysis response unless a newer one already landed.
    /// Returns whether it was applied.
    pub(crate) fn finish_analysis(&mut self, seq: u64, text: &str) -> bool {
        if seq <= self.analysis_applied {
            return false;
        }
        self.analysis_applied = seq;
        self.analysis = Some(text.trim().to_string());
        if seq == self.analysis_issued {
            self.analysis_status = AnalysisStatus::Ready;
        }
        true
    }

    /// Record a failed analysis request. Failures of superseded requests are
    /// ignored. Returns whether the failure belongs to the newest request.
    pub(crate) fn fail_analysis(&mut self, seq: u64) -> bool {
        if seq != self.analysis_issued {
            return false;
        }
        self.analysis_applied = self.analysis_applied.max(seq);
        self.analysis_status = AnalysisStatus::Failed;
        true
    }

    pub(crate) fn raise(&mut self, message: String) -> u64 {
        self.next_notice_id += 1;
        self.error = Some(Notice {
            id: self.next_notice_id,
            message,
        });
        self.next_notice_id
    }

    pub(crate) fn clear_error(&mut self) -> bool {
        self.error.take().is_some()
    }

    /// Clear the error only if it is still notice `id`.
    pub(crate) fn expire_notice(&mut self, id: u64) -> bool {
        if self.error.as_ref().is_some_and(|n| n.id == id) {
            self.error = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            fen: self.engine.fen(),
            moves: self.history.moves().to_vec(),
            side_to_move: self.engine.turn(),
            user_side: self.user_side,
            status: self.engine.status(),
            analysis: self.analysis.clone(),
            analysis_status: self.analysis_status,
            error: self.error.clone(),
            awaiting_reply: self.awaiting_reply,
        }
    }
}
