//! GUI-side codec for the UCI (Universal Chess Interface) protocol.
//!
//! An analysis front end talks to an engine process by writing
//! [`GuiCommand`]s to its stdin and reading [`EngineMessage`]s from its
//! stdout. This crate formats the former and parses the latter; process
//! management lives with the caller.
//!
//! # Commands sent to the engine
//!
//! - `uci` / `isready` / `ucinewgame` - Handshake and synchronization
//! - `setoption name <name> [value <value>]` - Engine configuration
//! - `position startpos|fen <fen> [moves <move>...]` - Set position
//! - `go [depth <d>] [movetime <ms>] [nodes <n>] [infinite]` - Start search
//! - `stop` / `quit`
//!
//! # Example
//!
//! ```
//! use uci::{EngineMessage, GoOptions, GuiCommand, Score};
//!
//! let go = GuiCommand::Go(GoOptions::depth(18));
//! assert_eq!(go.to_uci(), "go depth 18");
//!
//! let msg = EngineMessage::parse("info depth 12 score cp 35 pv e7e5 g1f3").unwrap();
//! if let EngineMessage::Info(info) = msg {
//!     assert_eq!(info.score, Some(Score::Cp(35)));
//! }
//! ```

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{Bound, EngineInfo, Score};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UciError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found; ends the current search.
    BestMove { mv: String, ponder: Option<String> },
    /// Option declaration, kept as the raw text after `option `.
    Option(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    ///
    /// Returns `None` for blank lines and for anything the protocol does not
    /// define, which engines are free to print.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim_start()),
            None => (line, ""),
        };

        match keyword {
            "uciok" => Some(EngineMessage::UciOk),
            "readyok" => Some(EngineMessage::ReadyOk),
            "info" => EngineInfo::parse(line).map(EngineMessage::Info),
            "bestmove" => {
                let mut parts = rest.split_whitespace();
                let mv = parts.next()?.to_string();
                let ponder = match parts.next() {
                    Some("ponder") => parts.next().map(str::to_string),
                    _ => None,
                };
                Some(EngineMessage::BestMove { mv, ponder })
            }
            "id" => {
                if let Some(name) = rest.strip_prefix("name ") {
                    Some(EngineMessage::Id {
                        name: Some(name.trim().to_string()),
                        author: None,
                    })
                } else {
                    rest.strip_prefix("author ").map(|author| EngineMessage::Id {
                        name: None,
                        author: Some(author.trim().to_string()),
                    })
                }
            }
            "option" => Some(EngineMessage::Option(rest.to_string())),
            _ => None,
        }
    }
}
