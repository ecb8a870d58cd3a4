//! The single error kind surfaced by web search implementations.

use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Normalized configuration/search failure.
///
/// Adapters fold every provider-specific failure into this one kind with a
/// human-readable message. The original failure stays reachable through
/// [`std::error::Error::source`] for diagnostics, so no caller ever needs to
/// match on provider error types.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SearchError {
    message: String,
    #[source]
    source: Option<BoxedCause>,
}

impl SearchError {
    /// A failure with no underlying cause, e.g. a missing credential.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// A failure that wraps the upstream error as its cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
