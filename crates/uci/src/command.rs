//! Commands sent from the GUI to the engine.

use crate::UciError;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// The next search belongs to a different game.
    UciNewGame,
    /// Configure an engine option.
    SetOption { name: String, value: Option<String> },
    /// Set up position. `fen: None` means the standard starting position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Stop calculating.
    Stop,
    /// Quit the engine.
    Quit,
}

/// Search limits for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search to this depth.
    pub depth: Option<u32>,
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search this many nodes.
    pub nodes: Option<u64>,
    /// Search indefinitely until `stop`.
    pub infinite: bool,
}

impl GoOptions {
    /// Depth-limited search.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }
}

impl GuiCommand {
    /// Set up an arbitrary position given as FEN.
    pub fn position_fen(fen: &str) -> Self {
        GuiCommand::Position {
            fen: Some(fen.to_string()),
            moves: Vec::new(),
        }
    }

    /// Format the command as a single protocol line (no trailing newline).
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            GuiCommand::Position { fen, moves } => {
                let mut line = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    line.push_str(" moves ");
                    line.push_str(&moves.join(" "));
                }
                line
            }
            GuiCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                if let Some(t) = opts.movetime {
                    parts.push(format!("movetime {}", t));
                }
                if let Some(n) = opts.nodes {
                    parts.push(format!("nodes {}", n));
                }
                if opts.infinite {
                    parts.push("infinite".to_string());
                }
                parts.join(" ")
            }
            GuiCommand::Stop => "stop".to_string(),
            GuiCommand::Quit => "quit".to_string(),
        }
    }

    /// Parse a command line as an engine would read it.
    pub fn parse(input: &str) -> Result<Self, UciError> {
        let input = input.trim();
        let mut parts = input.split_whitespace();

        match parts.next().unwrap_or("") {
            "uci" => Ok(GuiCommand::Uci),
            "isready" => Ok(GuiCommand::IsReady),
            "ucinewgame" => Ok(GuiCommand::UciNewGame),
            "stop" => Ok(GuiCommand::Stop),
            "quit" => Ok(GuiCommand::Quit),
            "setoption" => Self::parse_setoption(parts),
            "position" => Self::parse_position(parts),
            "go" => Ok(Self::parse_go(parts)),
            _ => Err(UciError::InvalidCommand(input.to_string())),
        }
    }

    fn parse_setoption<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        if parts.next() != Some("name") {
            return Err(UciError::ParseError("Expected 'name'".to_string()));
        }

        let mut name = Vec::new();
        let mut value = Vec::new();
        let mut in_value = false;
        for part in parts {
            if part == "value" && !in_value {
                in_value = true;
            } else if in_value {
                value.push(part);
            } else {
                name.push(part);
            }
        }

        if name.is_empty() {
            return Err(UciError::ParseError("Empty option name".to_string()));
        }

        Ok(GuiCommand::SetOption {
            name: name.join(" "),
            value: in_value.then(|| value.join(" ")),
        })
    }

    fn parse_position<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Self, UciError> {
        let fen = match parts.next() {
            Some("startpos") => None,
            Some("fen") => {
                let fen_parts: Vec<&str> = parts.by_ref().take_while(|&p| p != "moves").collect();
                if fen_parts.is_empty() {
                    return Err(UciError::ParseError("Empty FEN".to_string()));
                }
                Some(fen_parts.join(" "))
            }
            Some(other) => {
                return Err(UciError::ParseError(format!(
                    "Expected 'startpos' or 'fen', got '{}'",
                    other
                )));
            }
            None => {
                return Err(UciError::ParseError(
                    "Expected 'startpos' or 'fen'".to_string(),
                ));
            }
        };

        // After startpos the next token is "moves"; after a FEN it was consumed above.
        let moves = parts
            .skip_while(|&p| p == "moves")
            .map(str::to_string)
            .collect();

        Ok(GuiCommand::Position { fen, moves })
    }

    fn parse_go<'a>(mut parts: impl Iterator<Item = &'a str>) -> Self {
        let mut opts = GoOptions::default();

        while let Some(part) = parts.next() {
            match part {
                "depth" => opts.depth = parts.next().and_then(|v| v.parse().ok()),
                "movetime" => opts.movetime = parts.next().and_then(|v| v.parse().ok()),
                "nodes" => opts.nodes = parts.next().and_then(|v| v.parse().ok()),
                "infinite" => opts.infinite = true,
                _ => {}
            }
        }

        GuiCommand::Go(opts)
    }
}
