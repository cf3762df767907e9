//! The analysis state surfaced to presentation.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use shakmaty::Square;

/// Reported depth shown before the first evaluation arrives.
pub const INITIAL_DEPTH: u32 = 10;

/// Characters of the principal line shown in the header.
pub const BEST_LINE_PREVIEW_CHARS: usize = 40;

/// Origin and destination of the evaluator's preferred move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestedMove {
    pub from: Square,
    pub to: Square,
}

impl SuggestedMove {
    /// Reads the first token of a principal line as a square pair.
    ///
    /// Only the first four characters are used, so a promotion suffix
    /// (`e7e8q`) is ignored. Anything shorter or malformed yields `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        let token = line.split_whitespace().next()?.as_bytes();
        if token.len() < 4 {
            return None;
        }
        let from = Square::from_ascii(&token[0..2]).ok()?;
        let to = Square::from_ascii(&token[2..4]).ok()?;
        Some(Self { from, to })
    }
}

impl Serialize for SuggestedMove {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SuggestedMove", 2)?;
        state.serialize_field("from", &self.from.to_string())?;
        state.serialize_field("to", &self.to.to_string())?;
        state.end()
    }
}

/// A single highlighted arrow for the board widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrow {
    pub from: Square,
    pub to: Square,
    pub color: String,
}

/// Consolidated "best known" analysis of the current position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    /// Evaluation in pawns, positive when White is better.
    pub score: f64,
    /// `#N` when the evaluator reports a forced mate.
    ///
    /// Unlike `score`, `N` keeps the evaluator's sign: positive when the side
    /// to move at request time mates, negative when it gets mated. After
    /// `1.e4` a `#3` therefore favours Black.
    pub mate: Option<String>,
    /// Depth of the last accepted update.
    pub depth: u32,
    /// Principal variation, space separated.
    pub principal_line: String,
    /// Derived from the first move of `principal_line`.
    pub suggested_move: Option<SuggestedMove>,
}

impl Default for AnalysisSnapshot {
    fn default() -> Self {
        Self {
            score: 0.0,
            mate: None,
            depth: INITIAL_DEPTH,
            principal_line: String::new(),
            suggested_move: None,
        }
    }
}

impl AnalysisSnapshot {
    /// Replaces the principal line and re-derives the suggested move.
    pub fn set_principal_line(&mut self, line: String) {
        self.suggested_move = SuggestedMove::from_line(&line);
        self.principal_line = line;
    }

    /// Forgets position-specific annotations (mate and line). Score and
    /// depth are kept until the next update overwrites them.
    pub fn clear_line(&mut self) {
        self.mate = None;
        self.principal_line.clear();
        self.suggested_move = None;
    }

    /// Text for the evaluation field: the mate annotation when present,
    /// otherwise the score.
    pub fn evaluation_text(&self) -> String {
        match &self.mate {
            Some(mate) => mate.clone(),
            None => self.score.to_string(),
        }
    }

    /// Leading part of the principal line, cut on a character boundary.
    pub fn best_line_preview(&self) -> &str {
        match self.principal_line.char_indices().nth(BEST_LINE_PREVIEW_CHARS) {
            Some((idx, _)) => &self.principal_line[..idx],
            None => &self.principal_line,
        }
    }

    /// The suggested move as an arrow in the given colour.
    pub fn arrow(&self, color: &str) -> Option<Arrow> {
        self.suggested_move.map(|m| Arrow {
            from: m.from,
            to: m.to,
            color: color.to_string(),
        })
    }
}
