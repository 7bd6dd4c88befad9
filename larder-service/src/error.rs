//! Service-level errors.

use larder_core::CoreError;
use larder_llm::FallbackError;
use thiserror::Error;

/// Errors returned by [`crate::pantry::Pantry`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Validation, storage, or lookup failure from `larder-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The fallback provider failed. Generation itself never surfaces errors.
    #[error("suggestion unavailable: {0}")]
    Generation(#[from] FallbackError),

    /// The token did not identify a known user.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but may not perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The global tracing subscriber could not be installed.
    #[error("telemetry setup failed: {0}")]
    Telemetry(String),
}

/// Convenience result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
