//! Evaluation updates as the controller sees them.

use shakmaty::Color;
use uci::{EngineInfo, Score};

/// One evaluation update from the evaluator.
///
/// Any subset of fields may be present. A field that is `None` says nothing
/// about that aspect of the analysis; `Some(0)` is a real value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationMessage {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Score from the side to move's point of view.
    pub score_cp: Option<i32>,
    /// Signed moves to forced mate, from the side to move's point of view.
    pub mate_in: Option<i32>,
    /// Principal variation as UCI move tokens.
    pub pv: Option<Vec<String>>,
}

impl EvaluationMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn score_cp(mut self, cp: i32) -> Self {
        self.score_cp = Some(cp);
        self
    }

    pub fn mate_in(mut self, moves: i32) -> Self {
        self.mate_in = Some(moves);
        self
    }

    /// Sets the principal variation from a space separated line.
    pub fn pv(mut self, line: &str) -> Self {
        self.pv = Some(line.split_whitespace().map(str::to_string).collect());
        self
    }

    /// True if the message carries none of the fields the snapshot tracks.
    pub fn is_empty(&self) -> bool {
        self.depth.is_none() && self.score_cp.is_none() && self.mate_in.is_none() && self.pv.is_none()
    }

    /// Extracts the analysis fields of an engine `info` line.
    ///
    /// Returns `None` for lines with nothing to contribute, such as
    /// `info string ...` or a bare `info nodes ...` heartbeat.
    pub fn from_info(info: &EngineInfo) -> Option<Self> {
        let (score_cp, mate_in) = match info.score {
            Some(Score::Cp(cp)) => (Some(cp), None),
            Some(Score::Mate(m)) => (None, Some(m)),
            None => (None, None),
        };
        let message = Self {
            depth: info.depth,
            score_cp,
            mate_in,
            pv: info.pv.clone(),
        };
        (!message.is_empty()).then_some(message)
    }
}

/// Converts a side-to-move centipawn score into pawns from White's side.
pub fn normalize_score(score_cp: i32, side_to_move: Color) -> f64 {
    let sign = side_to_move.fold_wb(1.0, -1.0);
    sign * f64::from(score_cp) / 100.0
}
