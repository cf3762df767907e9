//! UCI engine process driven as an [`Evaluator`].
//!
//! The engine runs as a child process. After the handshake two tasks own its
//! pipes: a writer draining queued command lines into stdin and a reader
//! turning stdout into [`EvaluatorEvent`]s.
//!
//! Each `go` answers with exactly one `bestmove`, including a search ended by
//! `stop`. The reader attributes output to the oldest search that has not yet
//! produced its `bestmove`, so the tail of a stopped search keeps the token of
//! the request it belongs to.

use crate::config::EngineConfig;
use crate::evaluator::{Evaluator, EvaluatorEvent, RequestToken};
use crate::rules::Position;
use crate::EvaluationMessage;
use std::collections::VecDeque;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use uci::{EngineMessage, GoOptions, GuiCommand};

/// Maximum number of lines to read before giving up on a handshake response.
pub const MAX_UCI_LINES: usize = 1000;

/// How long [`UciEvaluator::quit`] waits before killing the process.
const QUIT_GRACE: Duration = Duration::from_millis(100);

/// Errors that can occur when starting a chess engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or talk to it.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found.
    #[error("Engine not found at path: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine closed its output during the handshake.
    #[error("Engine closed unexpectedly")]
    Closed,
}

/// Searches that have been started but not yet answered with `bestmove`.
#[derive(Debug, Default)]
struct SearchQueue {
    outstanding: VecDeque<RequestToken>,
}

impl SearchQueue {
    fn started(&mut self, token: RequestToken) {
        self.outstanding.push_back(token);
    }

    /// Tags one line of engine output with the search it belongs to.
    fn event_for(&mut self, message: EngineMessage) -> Option<EvaluatorEvent> {
        match message {
            EngineMessage::Info(info) => {
                let token = *self.outstanding.front()?;
                EvaluationMessage::from_info(&info)
                    .map(|message| EvaluatorEvent::Evaluation { token, message })
            }
            EngineMessage::BestMove { mv, .. } => {
                let token = self.outstanding.pop_front()?;
                Some(EvaluatorEvent::SearchFinished {
                    token,
                    best_move: (mv != "(none)").then_some(mv),
                })
            }
            _ => None,
        }
    }
}

fn lock(queue: &Mutex<SearchQueue>) -> MutexGuard<'_, SearchQueue> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running UCI engine.
pub struct UciEvaluator {
    commands: mpsc::UnboundedSender<String>,
    searches: Arc<Mutex<SearchQueue>>,
    child: Child,
    name: String,
}

impl UciEvaluator {
    /// Spawns the engine and performs the UCI handshake.
    ///
    /// Returns the evaluator together with the receiving end of its event
    /// channel. The channel closes when the engine's output ends.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the executable does not exist
    /// - `EngineError::SpawnError` if the process fails to start
    /// - `EngineError::InitFailed` / `EngineError::Closed` if the handshake fails
    pub async fn spawn(
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<EvaluatorEvent>), EngineError> {
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    EngineError::NotFound(config.path.display().to_string())
                }
                _ => EngineError::SpawnError(e),
            })?;

        let mut stdin = child.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = child.stdout.take().ok_or(EngineError::InitFailed)?;
        let mut lines = BufReader::new(stdout).lines();

        let name = handshake(&mut stdin, &mut lines, &config.uci_options()).await?;
        tracing::info!(engine = %name, path = %config.path.display(), "UCI engine ready");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let searches = Arc::new(Mutex::new(SearchQueue::default()));

        tokio::spawn(write_commands(stdin, command_rx));
        tokio::spawn(read_events(lines, Arc::clone(&searches), event_tx));

        let evaluator = Self {
            commands: command_tx,
            searches,
            child,
            name,
        };
        Ok((evaluator, event_rx))
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends `quit` and waits briefly for the process to exit, then kills it.
    pub async fn quit(mut self) {
        self.send(&GuiCommand::Quit);
        if tokio::time::timeout(QUIT_GRACE, self.child.wait())
            .await
            .is_err()
        {
            let _ = self.child.kill().await;
        }
    }

    fn send(&self, command: &GuiCommand) {
        let line = command.to_uci();
        tracing::trace!(%line, ">> engine");
        if self.commands.send(line).is_err() {
            tracing::warn!("engine input closed, analysis will stall");
        }
    }
}

impl Evaluator for UciEvaluator {
    fn request_evaluation(&mut self, token: RequestToken, position: &Position, depth_limit: u32) {
        // Registered before `go` is queued so no output can precede it.
        lock(&self.searches).started(token);
        self.send(&GuiCommand::position_fen(position.fen()));
        self.send(&GuiCommand::Go(GoOptions::depth(depth_limit)));
    }

    fn stop(&mut self) {
        self.send(&GuiCommand::Stop);
    }
}

impl Drop for UciEvaluator {
    fn drop(&mut self) {
        let _ = self.commands.send(GuiCommand::Quit.to_uci());
    }
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

/// Reads engine output until `done` accepts a message.
async fn wait_for(
    lines: &mut Lines<BufReader<ChildStdout>>,
    mut done: impl FnMut(&EngineMessage) -> bool,
) -> Result<(), EngineError> {
    for _ in 0..MAX_UCI_LINES {
        let line = lines.next_line().await?.ok_or(EngineError::Closed)?;
        tracing::trace!(%line, "<< engine");
        if let Some(message) = EngineMessage::parse(&line) {
            if done(&message) {
                return Ok(());
            }
        }
    }
    Err(EngineError::InitFailed)
}

async fn handshake(
    stdin: &mut ChildStdin,
    lines: &mut Lines<BufReader<ChildStdout>>,
    options: &[(String, String)],
) -> Result<String, EngineError> {
    write_line(stdin, &GuiCommand::Uci.to_uci()).await?;

    let mut name = String::new();
    wait_for(lines, |message| match message {
        EngineMessage::Id {
            name: Some(reported),
            ..
        } => {
            name = reported.clone();
            false
        }
        EngineMessage::UciOk => true,
        _ => false,
    })
    .await?;

    for (option, value) in options {
        let command = GuiCommand::SetOption {
            name: option.clone(),
            value: Some(value.clone()),
        };
        tracing::debug!(%option, %value, "setting engine option");
        write_line(stdin, &command.to_uci()).await?;
    }

    write_line(stdin, &GuiCommand::UciNewGame.to_uci()).await?;
    write_line(stdin, &GuiCommand::IsReady.to_uci()).await?;
    wait_for(lines, |message| *message == EngineMessage::ReadyOk).await?;

    if name.is_empty() {
        name = "Unknown Engine".to_string();
    }
    Ok(name)
}

async fn write_commands(mut stdin: ChildStdin, mut commands: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = commands.recv().await {
        if let Err(e) = write_line(&mut stdin, &line).await {
            tracing::warn!(error = %e, "failed writing to engine, analysis will stall");
            break;
        }
    }
}

async fn read_events(
    mut lines: Lines<BufReader<ChildStdout>>,
    searches: Arc<Mutex<SearchQueue>>,
    events: mpsc::UnboundedSender<EvaluatorEvent>,
) {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::warn!("engine output closed, analysis will stall");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed reading engine output");
                break;
            }
        };
        tracing::trace!(%line, "<< engine");

        let Some(message) = EngineMessage::parse(&line) else {
            continue;
        };
        let event = lock(&searches).event_for(message);
        if let Some(event) = event {
            if events.send(event).is_err() {
                break;
            }
        }
    }
}
