//! Generation error types.
//!
//! [`LlmError`] covers everything that can go wrong in a single attempt. The
//! retry loop in [`crate::generator`] absorbs all of them. [`FallbackError`]
//! is the only error a caller of the generator ever sees.

use std::time::Duration;

use thiserror::Error;

use crate::types::OutputShape;

/// Errors that can occur during one generation attempt.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-level failure: connection reset, DNS, TLS, body read.
    #[error("LLM transport failed: {0}")]
    Transport(String),

    /// The attempt exceeded its timeout.
    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-2xx status.
    #[error("LLM returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The service answered but the payload did not have the expected shape.
    #[error("LLM output malformed: {0}")]
    Malformed(String),

    /// No provider reachable or configured.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Short stable label, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status { .. } => "status",
            Self::Malformed(_) => "malformed",
            Self::Unavailable(_) => "unavailable",
            Self::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(Duration::ZERO)
        } else if err.is_connect() {
            LlmError::Unavailable(err.to_string())
        } else if err.is_decode() {
            LlmError::Malformed(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

/// The fallback provider could not produce a value.
///
/// Fallbacks must be infallible by construction, so this signals a
/// programming error and is the one failure `generate` propagates.
#[derive(Debug, Error)]
pub enum FallbackError {
    /// The provider has nothing for this request.
    #[error("fallback provider has no value: {0}")]
    Unavailable(String),

    /// The provider returned a value whose shape does not match the request.
    #[error("fallback returned {actual:?} for a {expected:?} request")]
    ShapeMismatch {
        /// Shape the request asked for.
        expected: OutputShape,
        /// Shape the provider produced.
        actual: OutputShape,
    },
}
