//! Error types for content store operations.

use thiserror::Error;

/// Errors that can occur while talking to a content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials were missing, invalid, or lacked access (401/403).
    #[error("unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Message returned by the store.
        message: String,
    },

    /// The requested path does not exist on the configured branch.
    #[error("path not found: {0}")]
    NotFound(String),

    /// The supplied content hash does not match the current remote state.
    #[error("conflict at {path}: {message}")]
    Conflict {
        /// Path that was being written or deleted.
        path: String,
        /// Message returned by the store.
        message: String,
    },

    /// Any other non-success response.
    #[error("store error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message returned by the store.
        message: String,
    },

    /// Network or transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be interpreted.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),

    /// The request could not be built (bad base URL or path).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    /// Returns true if the error means "nothing at this path".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true for credential and permission failures.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status associated with the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) | Self::InvalidRequest(_) => None,
        }
    }
}

/// Result type for content store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(StoreError::NotFound("a".into()).status(), Some(404));
        assert_eq!(
            StoreError::Unauthorized {
                status: 401,
                message: "Bad credentials".into()
            }
            .status(),
            Some(401)
        );
        assert_eq!(StoreError::InvalidResponse("x".into()).status(), None);
    }

    #[test]
    fn test_error_predicates() {
        assert!(StoreError::NotFound("images".into()).is_not_found());
        assert!(!StoreError::NotFound("images".into()).is_unauthorized());
        assert!(StoreError::Unauthorized {
            status: 403,
            message: String::new()
        }
        .is_unauthorized());
    }
}
