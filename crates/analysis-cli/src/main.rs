//! Terminal analysis board.
//!
//! Reads moves and commands from stdin, keeps a UCI engine analysing the
//! current position and prints the evaluation, best line and board whenever
//! they change.

mod command;
mod render;

use analysis_board::{
    AnalysisConfig, AnalysisController, Evaluator, MoveOutcome, Orientation, RulesState,
    StandardRules, UciEvaluator,
};
use anyhow::Context;
use clap::Parser;
use command::{CommandError, UserCommand};
use render::View;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Interactive chess position analysis backed by a UCI engine.
#[derive(Parser, Debug)]
#[command(name = "analysis-cli")]
#[command(about = "Interactive chess position analysis backed by a UCI engine")]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// UCI engine executable, overrides the config
    #[arg(short, long)]
    engine: Option<PathBuf>,

    /// Search depth limit, overrides the config
    #[arg(short, long)]
    depth: Option<u32>,

    /// Side shown at the bottom of the board (white or black)
    #[arg(short, long, value_parser = parse_orientation)]
    orientation: Option<Orientation>,

    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,

    /// Print every update as a JSON line
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. "debug" or "analysis_board=trace"
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(engine) = &self.engine {
            config.engine.path = engine.clone();
        }
        if let Some(depth) = self.depth {
            config.analysis.depth_limit = depth;
        }
        if let Some(orientation) = self.orientation {
            config.board.orientation = orientation;
        }
    }
}

fn parse_orientation(value: &str) -> Result<Orientation, String> {
    match value.to_ascii_lowercase().as_str() {
        "white" | "w" => Ok(Orientation::White),
        "black" | "b" => Ok(Orientation::Black),
        other => Err(format!("expected white or black, got {}", other)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.clone().unwrap_or_else(AnalysisConfig::config_path);
    let mut config = AnalysisConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    args.apply(&mut config);
    tracing::debug!(?config, "configuration loaded");

    let rules = match &args.fen {
        Some(fen) => StandardRules::from_fen(fen)?,
        None => StandardRules::new(),
    };

    let (engine, mut events) = UciEvaluator::spawn(&config.engine)
        .await
        .with_context(|| format!("starting engine {}", config.engine.path.display()))?;
    tracing::info!(engine = engine.name(), "engine started");

    let mut view = View::new(&config.board, args.json);
    let mut controller = AnalysisController::new(rules, engine, config.analysis);
    controller.start();
    show(&view, &controller)?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut engine_alive = true;

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match command::parse(&line) {
                    Ok(UserCommand::Quit) => break,
                    Ok(command) => {
                        if execute(&mut controller, &mut view, command) {
                            show(&view, &controller)?;
                        }
                    }
                    Err(CommandError::Empty) => {}
                    Err(e) => eprintln!("{}", e),
                }
            }
            event = events.recv(), if engine_alive => match event {
                Some(event) => {
                    if controller.handle_event(event) {
                        show(&view, &controller)?;
                    }
                }
                None => {
                    tracing::error!("engine exited, analysis is no longer updated");
                    engine_alive = false;
                }
            },
        }
    }

    controller.stop();
    controller.into_evaluator().quit().await;
    Ok(())
}

/// Applies a command. Returns `true` if the output should be redrawn.
fn execute<R: RulesState, E: Evaluator>(
    controller: &mut AnalysisController<R, E>,
    view: &mut View,
    command: UserCommand,
) -> bool {
    match command {
        UserCommand::Move {
            from,
            to,
            promotion,
        } => match controller.drop_piece(from, to, promotion) {
            MoveOutcome::Applied => true,
            MoveOutcome::Rejected => {
                eprintln!("Illegal move: {}{}", from, to);
                false
            }
        },
        UserCommand::Undo => controller.undo(),
        UserCommand::Reset => {
            controller.reset();
            true
        }
        UserCommand::Fen(fen) => controller.load_fen(&fen),
        UserCommand::Flip => {
            view.flip();
            true
        }
        UserCommand::Show => true,
        UserCommand::Stop => {
            controller.stop();
            false
        }
        UserCommand::Quit => false,
    }
}

fn show<R: RulesState, E: Evaluator>(
    view: &View,
    controller: &AnalysisController<R, E>,
) -> anyhow::Result<()> {
    let frame = view.frame(
        &controller.position(),
        controller.snapshot(),
        controller.is_terminal(),
    )?;
    println!("{}", frame);
    Ok(())
}
