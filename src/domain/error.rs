//! Error types for diffsurface.
//!
//! Diffing, layout and rendering are infallible by contract and degrade to a
//! best-effort result instead. Only configuration IO surfaces errors to the
//! caller; highlighter errors stay internal and select a fallback path.

use thiserror::Error;

/// Errors raised while loading or saving the view configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Reasons the structural highlighter could not produce tokens.
///
/// These never reach the caller of a highlight operation; they pick the
/// next step of the fallback chain.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("No grammar for language: {0}")]
    UnknownLanguage(String),

    #[error("Parse failed: {0}")]
    Parse(String),

    #[error("Scope stack error: {0}")]
    Scope(String),
}

impl From<syntect::parsing::ParsingError> for HighlightError {
    fn from(err: syntect::parsing::ParsingError) -> Self {
        HighlightError::Parse(err.to_string())
    }
}

impl From<syntect::parsing::ScopeError> for HighlightError {
    fn from(err: syntect::parsing::ScopeError) -> Self {
        HighlightError::Scope(format!("{err:?}"))
    }
}
