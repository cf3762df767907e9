//! The evaluator seam: requests go in, token-tagged events come out.

use crate::rules::Position;
use crate::EvaluationMessage;
use std::fmt;

/// Identity of one analysis request. Tokens only ever increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Output of an evaluator, tagged with the request it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluatorEvent {
    /// An evaluation update.
    Evaluation {
        token: RequestToken,
        message: EvaluationMessage,
    },
    /// The search for `token` is over, either at its depth limit or after a
    /// stop.
    SearchFinished {
        token: RequestToken,
        best_move: Option<String>,
    },
}

impl EvaluatorEvent {
    pub fn token(&self) -> RequestToken {
        match self {
            EvaluatorEvent::Evaluation { token, .. } => *token,
            EvaluatorEvent::SearchFinished { token, .. } => *token,
        }
    }
}

/// An asynchronous position evaluator.
///
/// Both calls return immediately. Results arrive later as
/// [`EvaluatorEvent`]s carrying the token passed to
/// [`request_evaluation`](Evaluator::request_evaluation). `stop` is advisory:
/// events of a stopped request may still arrive afterwards.
pub trait Evaluator {
    /// Starts searching `position` up to `depth_limit` plies.
    fn request_evaluation(&mut self, token: RequestToken, position: &Position, depth_limit: u32);

    /// Asks the evaluator to abandon the current search.
    fn stop(&mut self);
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn request_evaluation(&mut self, token: RequestToken, position: &Position, depth_limit: u32) {
        (**self).request_evaluation(token, position, depth_limit)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
