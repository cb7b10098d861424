//! Turn orchestration: user move → persona reply → analysis.
//!
//! `TurnOrchestrator` is the sole owner of the game. A user move is validated
//! and committed synchronously inside [`TurnOrchestrator::attempt_user_move`];
//! the persona's reply and the analysis run on a spawned task afterwards.
//!
//! Only one turn runs at a time. An atomic busy flag is taken when a user
//! move is accepted and released once the persona's reply has been applied
//! (or has failed), so a second move attempt during that window is rejected.
//! Analysis requests outlive the busy window and can overlap; each carries a
//! sequence number and a response older than one already shown is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chess_core::{PromotionPiece, Side};
use shakmaty::Square;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::clients::{GameAnalyst, MovePredictor, Prediction};
use crate::error::{ClientError, TurnError};
use crate::state::{GameSnapshot, GameState};

/// Per-game settings.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    /// Identity of the persona the predictions are requested for
    pub opponent: String,
    pub user_side: Side,
    /// Error notices are dismissed after this long
    pub notice_ttl: Duration,
}

pub struct TurnOrchestrator<P, A> {
    inner: Arc<Inner<P, A>>,
}

impl<P, A> Clone for TurnOrchestrator<P, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<P, A> {
    predictor: P,
    analyst: A,
    opponent: String,
    notice_ttl: Duration,
    state: Mutex<GameState>,
    busy: AtomicBool,
    updates: watch::Sender<GameSnapshot>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<P, A> TurnOrchestrator<P, A>
where
    P: MovePredictor,
    A: GameAnalyst,
{
    pub fn new(predictor: P, analyst: A, settings: TurnSettings) -> Self {
        let state = GameState::new(settings.user_side);
        let (updates, _) = watch::channel(state.snapshot());

        Self {
            inner: Arc::new(Inner {
                predictor,
                analyst,
                opponent: settings.opponent,
                notice_ttl: settings.notice_ttl,
                state: Mutex::new(state),
                busy: AtomicBool::new(false),
                updates,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.inner.lock_state().snapshot()
    }

    /// Receiver that sees every state change the orchestrator publishes.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Try to play the user's move `from` → `to` (squares like `"e2"`).
    ///
    /// `promotion_hint` is the board widget's piece code and only matters for
    /// pawn promotions; see [`PromotionPiece::from_piece_code`].
    ///
    /// Returns `false` without touching the game when the move is illegal,
    /// would end the game, or another turn is still waiting on its reply.
    /// On `true` the move is already in the history and the persona's reply
    /// is being fetched in the background. Must be called inside a Tokio
    /// runtime.
    pub fn attempt_user_move(&self, from: &str, to: &str, promotion_hint: Option<&str>) -> bool {
        // Any attempt dismisses the pending error, even one that is refused.
        self.dismiss_error();

        if !self.inner.try_acquire() {
            debug!(from, to, "Move attempt while a reply is pending");
            return false;
        }

        if !self.inner.apply_user_move(from, to, promotion_hint) {
            self.inner.release();
            return false;
        }

        self.spawn_reply();
        true
    }

    /// When the user plays Black the persona has to open the game. Requests
    /// that first move; returns whether a request was started.
    pub fn begin(&self) -> bool {
        if !self.inner.try_acquire() {
            return false;
        }

        {
            let mut state = self.inner.lock_state();
            if state.user_side() != Side::Black || !state.history().is_empty() {
                drop(state);
                self.inner.release();
                return false;
            }
            state.clear_error();
            state.mark_analysis_pending();
            state.set_awaiting_reply(true);
            self.inner.publish(&state);
        }

        info!(opponent = %self.inner.opponent, "Requesting the persona's opening move");
        self.spawn_reply();
        true
    }

    pub fn dismiss_error(&self) {
        let mut state = self.inner.lock_state();
        if state.clear_error() {
            self.inner.publish(&state);
        }
    }

    /// Wait until the persona's reply to the last accepted move has landed.
    pub async fn reply_settled(&self) {
        let mut updates = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = updates.wait_for(|snapshot| !snapshot.awaiting_reply).await;
    }

    /// Wait for every spawned turn, analysis included, to finish.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.inner.lock_tasks());
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(e) = handle.await {
                    warn!("Turn task ended abnormally: {e}");
                }
            }
        }
    }

    fn spawn_reply(&self) {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move { inner.run_reply().await });

        let mut tasks = self.inner.lock_tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }
}

impl<P, A> Inner<P, A>
where
    P: MovePredictor,
    A: GameAnalyst,
{
    fn lock_state(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    fn publish(&self, state: &GameState) {
        self.updates.send_replace(state.snapshot());
    }

    /// Validate and commit the user's move. Nothing is mutated unless the
    /// move is legal and leaves the game running.
    fn apply_user_move(&self, from: &str, to: &str, promotion_hint: Option<&str>) -> bool {
        let mut state = self.lock_state();

        let (Ok(from_sq), Ok(to_sq)) = (from.parse::<Square>(), to.parse::<Square>()) else {
            debug!(from, to, "Unparseable squares");
            return false;
        };
        let promotion = PromotionPiece::from_piece_code(promotion_hint);

        let mut candidate = state.engine().clone();
        let Some(applied) = candidate.apply_move(from_sq, to_sq, promotion) else {
            debug!(from, to, "Illegal user move");
            return false;
        };

        if candidate.is_game_over() || candidate.is_draw() {
            info!(san = %applied.san, status = ?candidate.status(), "User move would end the game; rejected");
            return false;
        }

        state.commit(candidate, applied.san.clone());
        state.mark_analysis_pending();
        state.set_awaiting_reply(true);
        self.publish(&state);

        info!(san = %applied.san, uci = %applied.uci, ply = state.history().len(), "User move accepted");
        true
    }

    /// Fetch and apply the persona's reply, then request analysis.
    async fn run_reply(self: Arc<Self>) {
        let history = self.lock_state().history().moves().to_vec();
        let outcome = self.predictor.predict(&history, &self.opponent).await;

        let Some((seq, joined, side)) = self.apply_reply(outcome) else {
            return;
        };

        let result = self.analyst.analyze(&joined, side).await;
        self.apply_analysis(seq, result);
    }

    /// Commit the reply (if any) and release the turn. Returns the analysis
    /// request to make, already registered so its sequence number reflects
    /// turn order.
    fn apply_reply(
        self: &Arc<Self>,
        outcome: Result<Option<Prediction>, ClientError>,
    ) -> Option<(u64, String, Side)> {
        let mut state = self.lock_state();

        let request = match outcome {
            Ok(None) => {
                info!(opponent = %self.opponent, "Persona has no reply");
                None
            }
            Ok(Some(prediction)) => {
                let mut candidate = state.engine().clone();
                match candidate.apply_notation(&prediction.notation) {
                    Some(applied) => {
                        info!(
                            san = %applied.san,
                            uci = %applied.uci,
                            source = prediction.source.as_deref().unwrap_or("unknown"),
                            "Persona reply applied"
                        );
                        state.commit(candidate, applied.san);

                        let joined = state.history().joined();
                        if joined.is_empty() {
                            None
                        } else {
                            let seq = state.begin_analysis();
                            Some((seq, joined, state.user_side()))
                        }
                    }
                    None => {
                        self.raise(&mut state, TurnError::IllegalPrediction(prediction.notation));
                        None
                    }
                }
            }
            Err(e) => {
                self.raise(&mut state, TurnError::Prediction(e));
                None
            }
        };

        if request.is_none() {
            state.settle_analysis_placeholder();
        }
        state.set_awaiting_reply(false);
        self.release();
        self.publish(&state);

        request
    }

    fn apply_analysis(self: &Arc<Self>, seq: u64, result: Result<String, ClientError>) {
        let mut state = self.lock_state();
        match result {
            Ok(text) => {
                if state.finish_analysis(seq, &text) {
                    info!(seq, len = text.len(), "Analysis updated");
                } else {
                    debug!(seq, "Stale analysis discarded");
                }
            }
            Err(e) => {
                if state.fail_analysis(seq) {
                    self.raise(&mut state, TurnError::Analysis(e));
                } else {
                    debug!(seq, "Superseded analysis failed: {e}");
                }
            }
        }
        self.publish(&state);
    }

    /// Set the pending error and schedule its dismissal.
    fn raise(self: &Arc<Self>, state: &mut GameState, err: TurnError) {
        warn!("{err}");
        let id = state.raise(err.to_string());

        let inner = Arc::clone(self);
        let ttl = self.notice_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = inner.lock_state();
            if state.expire_notice(id) {
                inner.publish(&state);
            }
        });
    }
}
