//! Interactive position analysis backed by a UCI engine.
//!
//! The user moves pieces, takes moves back, resets the board or pastes a FEN.
//! Each change must supersede whatever the engine is still thinking about and
//! restart analysis on the new position, while the view keeps showing a
//! coherent "best known" evaluation.
//!
//! # Overview
//!
//! - [`StandardRules`] - The position, legality and termination rules ([`RulesState`])
//! - [`UciEvaluator`] - A UCI engine process behind the [`Evaluator`] trait
//! - [`AnalysisController`] - Supersedes, filters and normalizes evaluator output
//! - [`AnalysisSnapshot`] - What the board widget renders
//! - [`AnalysisConfig`] - Engine, search and board settings from `analysis.toml`
//!
//! # Example
//!
//! ```ignore
//! use analysis_board::{AnalysisConfig, AnalysisController, StandardRules, UciEvaluator};
//!
//! let config = AnalysisConfig::default();
//! let (engine, mut events) = UciEvaluator::spawn(&config.engine).await?;
//! let mut controller = AnalysisController::new(StandardRules::new(), engine, config.analysis);
//! controller.start();
//! while let Some(event) = events.recv().await {
//!     if controller.handle_event(event) {
//!         println!("{}", controller.snapshot().evaluation_text());
//!     }
//! }
//! ```

pub mod config;
pub mod controller;
pub mod engine;
pub mod evaluation;
pub mod evaluator;
pub mod rules;
pub mod snapshot;

pub use config::{AnalysisConfig, AnalysisSettings, BoardConfig, ConfigError, EngineConfig, Orientation};
pub use controller::{AnalysisController, AnalysisState, MoveOutcome, PositionChange};
pub use engine::{EngineError, UciEvaluator};
pub use evaluation::{normalize_score, EvaluationMessage};
pub use evaluator::{Evaluator, EvaluatorEvent, RequestToken};
pub use rules::{InvalidFen, Position, RulesState, StandardRules};
pub use snapshot::{AnalysisSnapshot, Arrow, SuggestedMove};
