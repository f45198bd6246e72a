//! Error types for MicroFavola
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for MicroFavola operations
///
/// Only [`MicrofavolaError::Generation`] is ever surfaced to the user (as a
/// generic notice). Input rejections are suppressed by the controller and
/// storage failures are logged and swallowed by the history store.
#[derive(Error, Debug)]
pub enum MicrofavolaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The generation API returned no usable story, or the call failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Submission attempted with blank or whitespace-only input
    #[error("Input is empty")]
    EmptyInput,

    /// Submission attempted while a generation is outstanding
    #[error("A story is already being generated")]
    AlreadyInFlight,

    /// Unknown theme identifier supplied on the command line
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    /// History persistence errors (snapshot read, write, or removal)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for MicroFavola operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
