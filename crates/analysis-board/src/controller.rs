//! Position analysis controller.
//!
//! Keeps one evaluator in step with a position the user keeps changing.
//! Every position change supersedes the live request: the controller clears
//! the position-specific parts of the snapshot, stops the evaluator and,
//! unless the game is over, issues a fresh request under a new
//! [`RequestToken`]. Events are accepted only when they carry the live token,
//! so output the evaluator produces after a stop can never leak into the
//! analysis of the next position.
//!
//! ```text
//!            begin_analysis
//!   Idle ──────────────────────► Evaluating(token)
//!    ▲                               │
//!    └── position change, stop, ─────┘
//!        terminal position,
//!        search finished
//! ```

use crate::config::AnalysisSettings;
use crate::evaluation::normalize_score;
use crate::evaluator::{Evaluator, EvaluatorEvent, RequestToken};
use crate::rules::{Position, RulesState};
use crate::snapshot::AnalysisSnapshot;
use crate::EvaluationMessage;
use shakmaty::{Color, Role, Square};

/// What changed the position.
///
/// Every cause goes through the same supersession sequence; the cause is
/// recorded for logging and for the presentation layer only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionChange {
    UserMove,
    Undo,
    Reset,
    FenLoad,
}

/// Whether a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Evaluating(RequestToken),
}

/// Result of a move gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was legal and the position changed.
    Applied,
    /// The move was illegal; the piece should snap back.
    Rejected,
}

impl MoveOutcome {
    pub fn is_applied(self) -> bool {
        self == MoveOutcome::Applied
    }
}

/// Drives an [`Evaluator`] from the positions of a [`RulesState`].
pub struct AnalysisController<R, E> {
    rules: R,
    evaluator: E,
    settings: AnalysisSettings,
    snapshot: AnalysisSnapshot,
    state: AnalysisState,
    last_token: Option<RequestToken>,
    /// Side to move when the live request was issued.
    perspective: Color,
    last_change: Option<PositionChange>,
}

impl<R: RulesState, E: Evaluator> AnalysisController<R, E> {
    /// Creates an idle controller. Call [`start`](Self::start) to analyse the
    /// initial position.
    pub fn new(rules: R, evaluator: E, settings: AnalysisSettings) -> Self {
        let perspective = rules.current_position().side_to_move();
        Self {
            rules,
            evaluator,
            settings,
            snapshot: AnalysisSnapshot::default(),
            state: AnalysisState::Idle,
            last_token: None,
            perspective,
            last_change: None,
        }
    }

    /// Begins analysing the current position, if the game is not over.
    pub fn start(&mut self) -> Option<RequestToken> {
        if self.rules.is_terminal() {
            tracing::debug!("initial position is terminal, not analysing");
            return None;
        }
        let position = self.rules.current_position();
        Some(self.begin_analysis(&position))
    }

    /// Issues a request for `position` and makes it the live one.
    ///
    /// The caller guarantees `position` is not terminal. A request that is
    /// still live is stopped first.
    pub fn begin_analysis(&mut self, position: &Position) -> RequestToken {
        if let AnalysisState::Evaluating(_) = self.state {
            self.cancel_live_request();
        }

        let token = self
            .last_token
            .map_or(RequestToken::new(1), RequestToken::next);
        self.last_token = Some(token);
        self.perspective = position.side_to_move();

        tracing::debug!(%token, fen = %position, depth = self.settings.depth_limit, "requesting evaluation");
        self.evaluator
            .request_evaluation(token, position, self.settings.depth_limit);
        self.state = AnalysisState::Evaluating(token);
        token
    }

    /// Handles a piece dropped from `from` onto `to`.
    ///
    /// Illegal moves change nothing at all and are reported as
    /// [`MoveOutcome::Rejected`].
    pub fn drop_piece(&mut self, from: Square, to: Square, promotion: Option<Role>) -> MoveOutcome {
        match self.rules.apply_move(from, to, promotion) {
            Some(_) => {
                self.on_position_change(PositionChange::UserMove);
                MoveOutcome::Applied
            }
            None => {
                tracing::debug!(%from, %to, "rejected illegal move");
                MoveOutcome::Rejected
            }
        }
    }

    /// Takes back the last move. Returns `false` when there is nothing to
    /// undo, in which case nothing changes.
    pub fn undo(&mut self) -> bool {
        if !self.rules.undo() {
            return false;
        }
        self.on_position_change(PositionChange::Undo);
        true
    }

    /// Returns to the starting position and analyses it afresh.
    pub fn reset(&mut self) {
        self.rules.reset();
        self.on_position_change(PositionChange::Reset);
    }

    /// Loads a position from FEN. Invalid input is ignored and leaves the
    /// position, the analysis and the live request as they were.
    pub fn load_fen(&mut self, fen: &str) -> bool {
        if !self.rules.load_position(fen) {
            tracing::debug!(%fen, "ignoring invalid FEN");
            return false;
        }
        self.on_position_change(PositionChange::FenLoad);
        true
    }

    /// Stops the live request, if any, keeping the snapshot.
    pub fn stop(&mut self) {
        if let AnalysisState::Evaluating(_) = self.state {
            self.cancel_live_request();
        }
    }

    /// Supersedes the live request after the rules state changed.
    pub fn on_position_change(&mut self, cause: PositionChange) {
        self.last_change = Some(cause);
        self.snapshot.clear_line();

        if let AnalysisState::Evaluating(_) = self.state {
            self.cancel_live_request();
        }

        if self.rules.is_terminal() {
            tracing::debug!(?cause, "position is terminal, analysis idle");
            return;
        }
        let position = self.rules.current_position();
        self.begin_analysis(&position);
    }

    /// Routes an evaluator event. Returns `true` if the snapshot changed.
    pub fn handle_event(&mut self, event: EvaluatorEvent) -> bool {
        match event {
            EvaluatorEvent::Evaluation { token, message } => self.on_evaluation(token, &message),
            EvaluatorEvent::SearchFinished { token, best_move } => {
                if self.is_live(token) {
                    tracing::debug!(%token, ?best_move, "search finished");
                    self.state = AnalysisState::Idle;
                }
                false
            }
        }
    }

    /// Applies an evaluation update. Returns `true` if the snapshot changed.
    ///
    /// Updates for anything but the live request are dropped, as are updates
    /// reporting a depth below the configured minimum. Otherwise each field
    /// present in `message` overwrites its snapshot counterpart.
    pub fn on_evaluation(&mut self, token: RequestToken, message: &EvaluationMessage) -> bool {
        if !self.is_live(token) {
            tracing::trace!(%token, "discarding stale evaluation");
            return false;
        }
        if message.depth.is_some_and(|depth| depth < self.settings.min_depth) {
            return false;
        }

        let before = self.snapshot.clone();
        if let Some(cp) = message.score_cp {
            self.snapshot.score = normalize_score(cp, self.perspective);
        }
        if let Some(mate) = message.mate_in {
            self.snapshot.mate = Some(format!("#{}", mate));
        }
        if let Some(depth) = message.depth {
            self.snapshot.depth = depth;
        }
        if let Some(pv) = &message.pv {
            self.snapshot.set_principal_line(pv.join(" "));
        }
        self.snapshot != before
    }

    pub fn position(&self) -> Position {
        self.rules.current_position()
    }

    pub fn snapshot(&self) -> &AnalysisSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    /// Token of the outstanding request, if any.
    pub fn live_request(&self) -> Option<RequestToken> {
        match self.state {
            AnalysisState::Evaluating(token) => Some(token),
            AnalysisState::Idle => None,
        }
    }

    pub fn last_change(&self) -> Option<PositionChange> {
        self.last_change
    }

    pub fn is_terminal(&self) -> bool {
        self.rules.is_terminal()
    }

    pub fn settings(&self) -> AnalysisSettings {
        self.settings
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Consumes the controller, handing back the evaluator for shutdown.
    pub fn into_evaluator(self) -> E {
        self.evaluator
    }

    fn is_live(&self, token: RequestToken) -> bool {
        self.state == AnalysisState::Evaluating(token)
    }

    fn cancel_live_request(&mut self) {
        if let AnalysisState::Evaluating(token) = self.state {
            tracing::debug!(%token, "stopping superseded request");
        }
        self.evaluator.stop();
        self.state = AnalysisState::Idle;
    }
}
