//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while deriving quantities from one event
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    #[error("Event has no missing-energy source but '{0}' requires MET")]
    MissingMet(&'static str),
}

/// Errors raised while filling or combining collections
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Histogram '{0}' cannot be merged: bin edges differ")]
    BinningMismatch(String),

    #[error("Cannot merge '{key}': receiver holds a {expected}, other holds a {found}")]
    StructureMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("No collection registered under routing key '{0}'")]
    UnregisteredRouteKey(String),

    #[error("Key '{0}' is already registered in this group")]
    DuplicateKey(String),

    #[error("Key '{0}' is reserved")]
    ReservedKey(String),
}

/// Errors that can occur during event input parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event on line {line} of {file}: {source}")]
    InvalidEvent {
        file: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Input list {0} names no event files")]
    EmptyInputList(String),
}

/// Errors that can occur while loading the analysis config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
