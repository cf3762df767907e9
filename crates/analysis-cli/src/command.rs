//! Commands typed at the analysis prompt.

use shakmaty::uci::UciMove;
use shakmaty::{Role, Square};
use thiserror::Error;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Drop the piece on `from` onto `to`.
    Move {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    Undo,
    Reset,
    Fen(String),
    Flip,
    Show,
    Stop,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (try e2e4, undo, reset, fen <FEN>, flip, show, stop, quit)")]
    Unknown(String),
    #[error("not a move: {0}")]
    InvalidMove(String),
    #[error("fen needs a position")]
    MissingFen,
}

/// Parses a line of input.
///
/// A bare UCI move such as `e2e4` or `e7e8n` is accepted as well as the
/// `move e2e4` form.
pub fn parse(line: &str) -> Result<UserCommand, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" => Err(CommandError::Empty),
        "move" | "m" => parse_move(rest),
        "undo" | "u" => Ok(UserCommand::Undo),
        "reset" => Ok(UserCommand::Reset),
        "fen" if rest.is_empty() => Err(CommandError::MissingFen),
        "fen" => Ok(UserCommand::Fen(rest.to_string())),
        "flip" => Ok(UserCommand::Flip),
        "show" | "board" => Ok(UserCommand::Show),
        "stop" => Ok(UserCommand::Stop),
        "quit" | "exit" | "q" => Ok(UserCommand::Quit),
        other if rest.is_empty() => {
            parse_move(other).map_err(|_| CommandError::Unknown(other.to_string()))
        }
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_move(text: &str) -> Result<UserCommand, CommandError> {
    match UciMove::from_ascii(text.as_bytes()) {
        Ok(UciMove::Normal {
            from,
            to,
            promotion,
        }) => Ok(UserCommand::Move {
            from,
            to,
            promotion,
        }),
        _ => Err(CommandError::InvalidMove(text.to_string())),
    }
}
