//! Typed errors for the audit library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Every variant of [`AuditError`] is stage-local: stages catch it and
//! record it into `AuditState::errors`, so the pipeline itself never
//! surfaces one of these to the caller. Only a programming-invariant
//! violation (a panic) escapes a run.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while a stage talks to its external capability.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Fetching the source video failed
    #[error("download failed: {0}")]
    Download(String),

    /// External service call failed
    #[error("upstream error: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Polling for an external job exceeded its bound
    #[error("processing timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// Processing output was missing or malformed
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Input the pipeline cannot audit (e.g. a non-video-platform URL)
    #[error("unsupported input: {url}")]
    UnsupportedInput { url: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl From<PollError> for AuditError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Timeout(elapsed) => AuditError::Timeout { elapsed },
            PollError::Upstream(source) => AuditError::Upstream(source),
        }
    }
}

/// Errors from the long-poll supervisor.
#[derive(Debug, Error)]
pub enum PollError {
    /// The job did not complete within the configured bound
    #[error("polling timed out after {0:?}")]
    Timeout(Duration),

    /// The poll call itself failed
    #[error("upstream error while polling: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
