//! Error types for gridlock.
//!
//! All errors in gridlock are represented by [`GridlockError`], which covers
//! configuration issues, tmux failures, and capture problems. Geometry
//! parsing has its own [`GeometryError`] because capture recovers from it
//! instead of aborting.

use std::path::PathBuf;
use thiserror::Error;

/// All possible errors that can occur in gridlock.
#[derive(Error, Debug)]
pub enum GridlockError {
    /// Config file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failed.
    #[error("Failed to process YAML config: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing failed.
    #[error("Failed to parse TOML config: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// TOML serialization failed.
    #[error("Failed to serialize TOML config: {0}")]
    TomlWriteError(#[from] toml::ser::Error),

    /// The document parsed but describes an impossible session.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Refusing to overwrite an existing document.
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),

    /// A tmux command ran and reported failure.
    #[error("tmux {command} failed\nOutput: {output}")]
    TmuxError {
        /// The full argument list, space separated.
        command: String,
        /// Combined stdout and stderr of the failed command.
        output: String,
    },

    /// The tmux binary could not be started at all.
    #[error("Failed to launch tmux: {0}")]
    TmuxLaunch(std::io::Error),

    /// No current session could be determined.
    #[error("Not running inside or attached to a tmux session")]
    NotInTmux,

    /// The named session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A window layout string could not be parsed.
    #[error("Invalid layout geometry: {0}")]
    Geometry(#[from] GeometryError),
}

/// Ways a tmux layout geometry string can be malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The `WxH,X,Y` token is missing where a cell must start.
    #[error("expected WxH,X,Y at `{0}`")]
    MissingDimensions(String),

    /// The string ended right after a cell's dimensions.
    #[error("unexpected end of layout string")]
    UnexpectedEnd,

    /// A cell's dimensions were followed by something other than `,`, `{` or `[`.
    #[error("unexpected character after geometry: {0}")]
    UnexpectedChar(char),

    /// A leaf's pane id is not a number.
    #[error("invalid pane id: `{0}`")]
    InvalidPaneId(String),

    /// Brackets or braces do not pair up.
    #[error("mismatched brackets in layout")]
    Unbalanced,

    /// A `{}` or `[]` container with nothing inside.
    #[error("container without children")]
    EmptyContainer,

    /// Characters left over after a complete cell.
    #[error("trailing input after cell: `{0}`")]
    TrailingInput(String),
}

/// Convenient Result type alias for gridlock operations.
pub type Result<T> = std::result::Result<T, GridlockError>;
