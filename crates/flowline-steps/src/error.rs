//! Step and collaborator error types.

use thiserror::Error;

/// Errors raised inside a step executor.
///
/// These never cross the engine boundary: the step runner converts them
/// into failed [`crate::StepResult`]s.
#[derive(Debug, Error)]
pub enum StepError {
    /// Step configuration is invalid for the executor.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Collaborator call failed.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollabError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for StepError {
    fn from(e: serde_json::Error) -> Self {
        StepError::Json(e.to_string())
    }
}

/// Errors surfaced by collaborator interfaces.
#[derive(Debug, Error)]
pub enum CollabError {
    /// Non-success HTTP-equivalent status from a collaborator.
    ///
    /// Displays as the bare code so step-level messages read
    /// `"... failed: <status>"`.
    #[error("{0}")]
    Status(u16),

    /// Transport-level failure (connection, DNS, TLS).
    #[error("{0}")]
    Transport(String),

    /// Referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response or stored payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Collaborator is not configured or unreachable.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for CollabError {
    fn from(e: reqwest::Error) -> Self {
        CollabError::Transport(e.to_string())
    }
}
