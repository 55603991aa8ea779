//! Error types for sync operations.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to the sync server.
///
/// These never make local recording fail: the engine collapses them into
/// a sync outcome and the diary keeps working offline. Only local storage
/// errors escape the engine as hard failures.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport failure.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// Malformed request or response body.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No credentials available for an authenticated endpoint.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Request timed out.
    #[error("operation timed out")]
    Timeout,
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Timeout => true,
            // Server-side failures may clear; client errors won't
            SyncError::Http { status } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection reset").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::Http { status: 503 }.is_retryable());
        assert!(!SyncError::Http { status: 401 }.is_retryable());
        assert!(!SyncError::NotAuthenticated.is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::Http { status: 503 };
        assert_eq!(err.to_string(), "server returned HTTP 503");
    }
}
