//! Shared fixtures for controller tests.

#![allow(dead_code)]

use analysis_board::{
    AnalysisController, AnalysisSettings, Evaluator, Position, RequestToken, StandardRules,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
pub const FOOLS_MATE_FEN: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
pub const STALEMATE_FEN: &str = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1";

/// One call made on the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Request {
        token: RequestToken,
        fen: String,
        depth_limit: u32,
    },
    Stop,
}

/// Evaluator that records calls instead of searching.
#[derive(Debug, Default)]
pub struct RecordingEvaluator {
    pub calls: Vec<Call>,
}

impl RecordingEvaluator {
    pub fn requests(&self) -> Vec<(RequestToken, String)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Request { token, fen, .. } => Some((*token, fen.clone())),
                Call::Stop => None,
            })
            .collect()
    }

    pub fn stops(&self) -> usize {
        self.calls.iter().filter(|call| **call == Call::Stop).count()
    }
}

impl Evaluator for RecordingEvaluator {
    fn request_evaluation(&mut self, token: RequestToken, position: &Position, depth_limit: u32) {
        self.calls.push(Call::Request {
            token,
            fen: position.fen().to_string(),
            depth_limit,
        });
    }

    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }
}

pub type TestController = AnalysisController<StandardRules, RecordingEvaluator>;

/// Controller on the starting position with the opening request issued.
pub fn started() -> TestController {
    let mut controller = AnalysisController::new(
        StandardRules::new(),
        RecordingEvaluator::default(),
        AnalysisSettings::default(),
    );
    controller.start();
    controller
}

/// Controller on a custom position with its opening request issued, if any.
pub fn started_from(fen: &str) -> TestController {
    let mut controller = AnalysisController::new(
        StandardRules::from_fen(fen).expect("valid test FEN"),
        RecordingEvaluator::default(),
        AnalysisSettings::default(),
    );
    controller.start();
    controller
}
