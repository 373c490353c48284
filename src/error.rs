//! Error types for the suggestion cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Suggest Error Enum ==
/// Unified error type for the suggestion cache.
///
/// Searches never surface these to callers; they are logged and degraded to
/// empty results. Write-through helpers and configuration do return them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SuggestError {
    /// The backing store failed (connectivity, query error, ...)
    #[error("Data source error: {0}")]
    DataSource(String),

    /// The backing store did not answer in time
    #[error("Data source timed out after {0}ms")]
    Timeout(u64),

    /// Caller supplied unusable input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The worker pool no longer accepts jobs
    #[error("Search workers are shutting down")]
    ShuttingDown,

    /// A blocking job panicked or was cancelled
    #[error("Worker failure: {0}")]
    Worker(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A periodic maintenance task failed
    #[error("Maintenance task failed: {0}")]
    Maintenance(String),
}

// == Result Type Alias ==
/// Convenience Result type for the suggestion cache.
pub type Result<T> = std::result::Result<T, SuggestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SuggestError::DataSource("connection refused".to_string()).to_string(),
            "Data source error: connection refused"
        );
        assert_eq!(
            SuggestError::Timeout(250).to_string(),
            "Data source timed out after 250ms"
        );
        assert_eq!(
            SuggestError::ShuttingDown.to_string(),
            "Search workers are shutting down"
        );
    }
}
