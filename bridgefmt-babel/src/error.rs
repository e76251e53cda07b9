//! Error types for conversion operations

use thiserror::Error;

/// Failure reported by an entity lookup (user, channel, usergroup, media...).
///
/// Lookups are supplied by the host application, so the error carries a
/// human readable message and, optionally, the underlying cause.
#[derive(Debug, Error)]
#[error("lookup failed: {message}")]
pub struct LookupError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur while converting a message
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A lookup failed; the whole conversion is aborted
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// Input could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Envelope (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;

/// Result type returned by lookup implementations.
pub type LookupResult<T> = std::result::Result<T, LookupError>;
