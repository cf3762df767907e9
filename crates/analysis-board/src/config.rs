//! Configuration file loading for the analysis board.
//!
//! Every field has a default, so a missing file or an empty one yields a
//! working setup that expects `stockfish` on the `PATH`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Depth the evaluator is asked to search to.
pub const DEFAULT_DEPTH_LIMIT: u32 = 18;

/// Updates shallower than this are warm-up noise and get dropped.
pub const DEFAULT_MIN_DEPTH: u32 = 10;

/// Colour of the suggested-move arrow.
pub const DEFAULT_ARROW_COLOR: &str = "rgb(0, 128, 0)";

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// How the evaluator process is started.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Path to a UCI engine. Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_engine_path")]
    pub path: PathBuf,
    /// Extra command line arguments for the engine.
    #[serde(default)]
    pub args: Vec<String>,
    /// UCI options sent with `setoption` during the handshake,
    /// e.g. `Threads = 4` or `Hash = 256`.
    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

fn default_engine_path() -> PathBuf {
    PathBuf::from("stockfish")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            args: Vec::new(),
            options: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Options as `(name, value)` pairs ready for `setoption`.
    pub fn uci_options(&self) -> Vec<(String, String)> {
        self.options
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Search policy of the controller.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Depth limit of every request.
    #[serde(default = "default_depth_limit")]
    pub depth_limit: u32,
    /// Updates reporting a smaller depth are discarded.
    #[serde(default = "default_min_depth")]
    pub min_depth: u32,
}

fn default_depth_limit() -> u32 {
    DEFAULT_DEPTH_LIMIT
}

fn default_min_depth() -> u32 {
    DEFAULT_MIN_DEPTH
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            min_depth: DEFAULT_MIN_DEPTH,
        }
    }
}

/// Side of the board drawn at the bottom.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    White,
    #[default]
    Black,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::White => Orientation::Black,
            Orientation::Black => Orientation::White,
        }
    }
}

/// Presentation settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "default_arrow_color")]
    pub arrow_color: String,
}

fn default_arrow_color() -> String {
    DEFAULT_ARROW_COLOR.to_string()
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            arrow_color: default_arrow_color(),
        }
    }
}

/// Top-level configuration, read from `analysis.toml`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub board: BoardConfig,
}

impl AnalysisConfig {
    /// Loads the configuration from `path`.
    ///
    /// A missing file is not an error: the defaults are returned instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("analysis.toml")
    }
}
