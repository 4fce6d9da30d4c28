//! Error types for image hosting operations.

use repopix_store::StoreError;
use thiserror::Error;

use crate::auth::AuthError;

/// Result type for image hosting operations.
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can occur while managing hosted images.
#[derive(Debug, Error)]
pub enum HostError {
    /// Required repository identifiers or credentials are missing or rejected.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A path that must exist does not.
    #[error("not found: {0}")]
    NotFound(String),

    /// A file operation was pointed at a directory.
    #[error("expected a file, got a directory: {0}")]
    NotAFile(String),

    /// Input was rejected before any remote call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Access gate refused the supplied codes.
    #[error("access denied: {0}")]
    Access(#[from] AuthError),

    /// The content store failed.
    #[error(transparent)]
    Store(StoreError),

    /// Local I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be persisted.
    #[error("settings error: {0}")]
    Settings(String),
}

impl From<StoreError> for HostError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => Self::NotFound(path),
            StoreError::Unauthorized { status, message } => Self::Configuration(format!(
                "repository rejected the credentials ({status}): {message}"
            )),
            other => Self::Store(other),
        }
    }
}

impl From<config::ConfigError> for HostError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<validator::ValidationError> for HostError {
    fn from(err: validator::ValidationError) -> Self {
        let message = err
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| err.code.to_string());
        Self::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_into_taxonomy() {
        let err: HostError = StoreError::NotFound("images/a.png".into()).into();
        assert!(matches!(err, HostError::NotFound(p) if p == "images/a.png"));

        let err: HostError = StoreError::Unauthorized {
            status: 401,
            message: "Bad credentials".into(),
        }
        .into();
        assert!(matches!(err, HostError::Configuration(_)));

        let err: HostError = StoreError::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, HostError::Store(_)));
        assert!(err.to_string().contains("500"));
    }
}
