//! Behaviour of the analysis controller against a recording evaluator.

mod common;

use analysis_board::{
    AnalysisController, AnalysisSettings, AnalysisState, EvaluationMessage, EvaluatorEvent,
    MoveOutcome, PositionChange, RequestToken, StandardRules, SuggestedMove,
};
use common::*;
use shakmaty::Square;

const AFTER_E4_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const BEFORE_FOOLS_MATE_FEN: &str =
    "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";

fn token(value: u64) -> RequestToken {
    RequestToken::new(value)
}

#[test]
fn opening_position_is_analysed_on_start() {
    let controller = started();
    assert_eq!(
        controller.evaluator().calls,
        vec![Call::Request {
            token: token(1),
            fen: START_FEN.to_string(),
            depth_limit: 18,
        }]
    );
    assert_eq!(controller.state(), AnalysisState::Evaluating(token(1)));
}

#[test]
fn pawn_push_scenario() {
    let mut controller = started();

    let outcome = controller.drop_piece(Square::E2, Square::E4, None);
    assert_eq!(outcome, MoveOutcome::Applied);

    // Position updates synchronously with the gesture.
    assert_eq!(controller.position().fen(), AFTER_E4_FEN);
    assert_eq!(
        controller.evaluator().calls[1..],
        [
            Call::Stop,
            Call::Request {
                token: token(2),
                fen: AFTER_E4_FEN.to_string(),
                depth_limit: 18,
            },
        ]
    );
    assert_eq!(controller.last_change(), Some(PositionChange::UserMove));

    let changed = controller.on_evaluation(
        token(2),
        &EvaluationMessage::new().depth(12).score_cp(35).pv("e7e5 g1f3"),
    );
    assert!(changed);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.depth, 12);
    assert_eq!(snapshot.score, -0.35);
    assert_eq!(snapshot.principal_line, "e7e5 g1f3");
    assert_eq!(
        snapshot.suggested_move,
        Some(SuggestedMove {
            from: Square::E7,
            to: Square::E5
        })
    );
}

#[test]
fn superseded_requests_cannot_touch_snapshot() {
    let mut controller = started();
    controller.drop_piece(Square::E2, Square::E4, None);
    controller.drop_piece(Square::E7, Square::E5, None);
    assert_eq!(controller.live_request(), Some(token(3)));

    controller.on_evaluation(token(3), &EvaluationMessage::new().depth(11).score_cp(20).pv("g1f3"));
    let expected = controller.snapshot().clone();

    for stale in [token(1), token(2)] {
        let changed = controller.on_evaluation(
            stale,
            &EvaluationMessage::new().depth(30).score_cp(-900).mate_in(-1).pv("d8h4"),
        );
        assert!(!changed);
    }
    assert_eq!(controller.snapshot(), &expected);
    assert_eq!(controller.snapshot().score, 0.2);
}

#[test]
fn stale_event_through_handle_event_is_dropped() {
    let mut controller = started();
    controller.drop_piece(Square::D2, Square::D4, None);

    let changed = controller.handle_event(EvaluatorEvent::Evaluation {
        token: token(1),
        message: EvaluationMessage::new().depth(20).score_cp(50).pv("d2d4"),
    });
    assert!(!changed);
    assert!(controller.snapshot().principal_line.is_empty());
}

#[test]
fn shallow_updates_are_discarded() {
    let mut controller = started();
    let before = controller.snapshot().clone();

    let changed = controller.on_evaluation(
        token(1),
        &EvaluationMessage::new().depth(9).score_cp(80).mate_in(2).pv("e2e4"),
    );
    assert!(!changed);
    assert_eq!(controller.snapshot(), &before);
}

#[test]
fn minimum_depth_is_inclusive() {
    let mut controller = started();
    assert!(controller.on_evaluation(token(1), &EvaluationMessage::new().depth(10).score_cp(15)));
    assert_eq!(controller.snapshot().score, 0.15);
}

#[test]
fn depthless_update_is_applied() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(14).score_cp(30));

    assert!(controller.on_evaluation(token(1), &EvaluationMessage::new().pv("d2d4 d7d5")));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.principal_line, "d2d4 d7d5");
    assert_eq!(snapshot.depth, 14);
    assert_eq!(snapshot.score, 0.3);
}

#[test]
fn score_is_normalized_to_white() {
    let mut white = started();
    white.on_evaluation(token(1), &EvaluationMessage::new().depth(12).score_cp(250));
    assert_eq!(white.snapshot().score, 2.5);

    let mut black = started_from(AFTER_E4_FEN);
    black.on_evaluation(token(1), &EvaluationMessage::new().depth(12).score_cp(250));
    assert_eq!(black.snapshot().score, -2.5);
}

#[test]
fn zero_score_overwrites_previous_score() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).score_cp(120));
    assert!(controller.on_evaluation(token(1), &EvaluationMessage::new().depth(13).score_cp(0)));
    assert_eq!(controller.snapshot().score, 0.0);
}

#[test]
fn mate_does_not_touch_score() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).score_cp(120));

    controller.on_evaluation(token(1), &EvaluationMessage::new().mate_in(3));
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.mate.as_deref(), Some("#3"));
    assert_eq!(snapshot.score, 1.2);
    assert_eq!(snapshot.evaluation_text(), "#3");
}

#[test]
fn illegal_move_changes_nothing() {
    let mut controller = started();
    controller.on_evaluation(
        token(1),
        &EvaluationMessage::new().depth(15).score_cp(25).mate_in(7).pv("e2e4 e7e5"),
    );
    let position = controller.position();
    let snapshot = controller.snapshot().clone();
    let live = controller.live_request();
    let calls = controller.evaluator().calls.clone();

    let outcome = controller.drop_piece(Square::E2, Square::E5, None);

    assert_eq!(outcome, MoveOutcome::Rejected);
    assert_eq!(controller.position(), position);
    assert_eq!(controller.snapshot(), &snapshot);
    assert_eq!(controller.live_request(), live);
    assert_eq!(controller.evaluator().calls, calls);
    assert_eq!(controller.last_change(), None);
}

#[test]
fn reset_clears_line_and_reanalyses_start() {
    let mut controller = started();
    controller.drop_piece(Square::F2, Square::F3, None);
    controller.on_evaluation(
        token(2),
        &EvaluationMessage::new().depth(16).score_cp(-90).mate_in(-4).pv("e7e5 g2g4 d8h4"),
    );

    controller.reset();

    let snapshot = controller.snapshot();
    assert!(snapshot.mate.is_none());
    assert!(snapshot.principal_line.is_empty());
    assert!(snapshot.suggested_move.is_none());
    assert_eq!(controller.position().fen(), START_FEN);
    assert_eq!(controller.last_change(), Some(PositionChange::Reset));

    let calls = &controller.evaluator().calls;
    assert_eq!(calls[calls.len() - 2], Call::Stop);
    assert_eq!(
        calls[calls.len() - 1],
        Call::Request {
            token: token(3),
            fen: START_FEN.to_string(),
            depth_limit: 18,
        }
    );
}

#[test]
fn reset_on_start_position_still_issues_request() {
    let mut controller = started();
    controller.reset();
    assert_eq!(
        controller.evaluator().requests(),
        vec![(token(1), START_FEN.to_string()), (token(2), START_FEN.to_string())]
    );
}

#[test]
fn position_change_keeps_score_and_depth() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(17).score_cp(40).pv("e2e4"));
    controller.drop_piece(Square::E2, Square::E4, None);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.score, 0.4);
    assert_eq!(snapshot.depth, 17);
    assert!(snapshot.principal_line.is_empty());
}

#[test]
fn undo_reanalyses_previous_position() {
    let mut controller = started();
    controller.drop_piece(Square::E2, Square::E4, None);

    assert!(controller.undo());
    assert_eq!(controller.position().fen(), START_FEN);
    assert_eq!(controller.last_change(), Some(PositionChange::Undo));
    assert_eq!(
        controller.evaluator().requests().last(),
        Some(&(token(3), START_FEN.to_string()))
    );
}

#[test]
fn undo_without_history_is_a_no_op() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).pv("e2e4"));
    let calls = controller.evaluator().calls.clone();

    assert!(!controller.undo());
    assert_eq!(controller.evaluator().calls, calls);
    assert_eq!(controller.snapshot().principal_line, "e2e4");
    assert_eq!(controller.live_request(), Some(token(1)));
}

#[test]
fn invalid_fen_is_silently_ignored() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).mate_in(5));
    let snapshot = controller.snapshot().clone();
    let calls = controller.evaluator().calls.clone();

    assert!(!controller.load_fen("rnbqkbnr/pppppppp/8/8 w"));
    assert_eq!(controller.position().fen(), START_FEN);
    assert_eq!(controller.snapshot(), &snapshot);
    assert_eq!(controller.evaluator().calls, calls);
}

#[test]
fn fen_load_analyses_new_position() {
    let mut controller = started();
    assert!(controller.load_fen(AFTER_E4_FEN));
    assert_eq!(controller.last_change(), Some(PositionChange::FenLoad));
    assert_eq!(
        controller.evaluator().requests().last(),
        Some(&(token(2), AFTER_E4_FEN.to_string()))
    );
}

#[test]
fn terminal_fen_stops_without_new_request() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).mate_in(4).pv("e2e4"));

    assert!(controller.load_fen(STALEMATE_FEN));

    assert_eq!(controller.state(), AnalysisState::Idle);
    assert_eq!(controller.evaluator().requests().len(), 1);
    assert_eq!(controller.evaluator().stops(), 1);
    assert!(controller.snapshot().mate.is_none());
    assert!(controller.snapshot().principal_line.is_empty());
}

#[test]
fn mating_move_ends_analysis() {
    let mut controller = started_from(BEFORE_FOOLS_MATE_FEN);
    assert_eq!(controller.live_request(), Some(token(1)));

    let outcome = controller.drop_piece(Square::D8, Square::H4, None);

    assert_eq!(outcome, MoveOutcome::Applied);
    assert!(controller.is_terminal());
    assert_eq!(controller.state(), AnalysisState::Idle);
    assert_eq!(controller.evaluator().calls.last(), Some(&Call::Stop));

    // The stopped search's late output is not live any more.
    assert!(!controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).mate_in(1)));
}

#[test]
fn terminal_start_is_not_analysed() {
    let controller = started_from(FOOLS_MATE_FEN);
    assert_eq!(controller.state(), AnalysisState::Idle);
    assert!(controller.evaluator().calls.is_empty());
}

#[test]
fn leaving_terminal_position_resumes_analysis() {
    let mut controller = started_from(FOOLS_MATE_FEN);
    controller.reset();
    assert_eq!(controller.evaluator().calls.len(), 1);
    assert_eq!(controller.live_request(), Some(token(1)));
}

#[test]
fn configured_search_limits_are_used() {
    let settings = AnalysisSettings {
        depth_limit: 24,
        min_depth: 4,
    };
    let mut controller =
        AnalysisController::new(StandardRules::new(), RecordingEvaluator::default(), settings);
    controller.start();

    assert_eq!(
        controller.evaluator().calls,
        vec![Call::Request {
            token: token(1),
            fen: START_FEN.to_string(),
            depth_limit: 24,
        }]
    );
    assert!(controller.on_evaluation(token(1), &EvaluationMessage::new().depth(5).score_cp(10)));
}

#[test]
fn promotion_gesture_defaults_to_queen() {
    let mut controller = started_from("8/P7/8/8/8/8/8/k6K w - - 0 1");
    assert!(controller
        .drop_piece(Square::A7, Square::A8, None)
        .is_applied());
    assert!(controller.position().fen().starts_with("Q7/"));
}

#[test]
fn arrow_tracks_principal_line() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).pv("g1f3 d7d5"));

    let arrow = controller.snapshot().arrow("rgb(0, 128, 0)").unwrap();
    assert_eq!((arrow.from, arrow.to), (Square::G1, Square::F3));

    controller.drop_piece(Square::G1, Square::F3, None);
    assert!(controller.snapshot().arrow("rgb(0, 128, 0)").is_none());
}

#[test]
fn malformed_principal_line_yields_no_suggestion() {
    let mut controller = started();
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).pv("e2"));
    assert_eq!(controller.snapshot().principal_line, "e2");
    assert!(controller.snapshot().suggested_move.is_none());
}

#[test]
fn fifty_move_draw_is_not_analysed() {
    let controller = started_from("7k/8/8/8/8/8/R7/K7 w - - 100 120");
    assert!(controller.is_terminal());
    assert_eq!(controller.state(), AnalysisState::Idle);
    assert!(controller.evaluator().calls.is_empty());
}

#[test]
fn fifty_move_draw_reached_by_move_ends_analysis() {
    let mut controller = started_from("7k/8/8/8/8/8/R7/K7 w - - 99 120");
    assert_eq!(controller.live_request(), Some(token(1)));

    assert!(controller.drop_piece(Square::A2, Square::B2, None).is_applied());

    assert_eq!(controller.state(), AnalysisState::Idle);
    assert_eq!(
        controller.evaluator().calls,
        vec![
            Call::Request {
                token: token(1),
                fen: "7k/8/8/8/8/8/R7/K7 w - - 99 120".to_string(),
                depth_limit: 18,
            },
            Call::Stop,
        ]
    );
}

#[test]
fn threefold_repetition_ends_analysis() {
    let mut controller = started();
    let shuffle = [
        (Square::G1, Square::F3),
        (Square::G8, Square::F6),
        (Square::F3, Square::G1),
        (Square::F6, Square::G8),
    ];

    for (from, to) in shuffle.iter().chain(shuffle.iter()) {
        assert!(controller.drop_piece(*from, *to, None).is_applied());
    }

    assert!(controller.is_terminal());
    assert_eq!(controller.state(), AnalysisState::Idle);
    assert_eq!(controller.evaluator().requests().len(), 8);
    assert_eq!(controller.evaluator().calls.last(), Some(&Call::Stop));

    // Taking the repetition back resumes analysis.
    assert!(controller.undo());
    assert_eq!(controller.live_request(), Some(token(9)));
}

#[test]
fn mate_keeps_side_to_move_sign() {
    let mut controller = started_from(AFTER_E4_FEN);
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(12).score_cp(35));
    controller.on_evaluation(token(1), &EvaluationMessage::new().depth(13).mate_in(3));

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.score, -0.35);
    assert_eq!(snapshot.mate.as_deref(), Some("#3"));
}
