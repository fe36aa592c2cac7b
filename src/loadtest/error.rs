//! Load test error definitions.

use thiserror::Error;

/// Errors that stop a load test before any attempt is dispatched.
///
/// Per-attempt failures never show up here; they are counted and logged in
/// the [`ResultRecord`](crate::loadtest::ResultRecord).
#[derive(Debug, Error)]
pub enum LoadTestError {
    /// A submitted spec violates a precondition.
    #[error("invalid spec at index {index}: {reason}")]
    InvalidSpec { index: usize, reason: String },

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result alias for load test operations.
pub type LoadTestResult<T> = Result<T, LoadTestError>;
