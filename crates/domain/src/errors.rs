//! Error types used throughout the client
//!
//! Every networked operation classifies its failure into exactly one of the
//! kinds below. Local validation failures never reach the network.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Main error type for ThreadLoom operations
#[derive(Error, Debug)]
pub enum ThreadLoomError {
    /// Remote rejected the credential (401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Credential is valid but access is denied (403)
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unknown thread or folder id (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Local validation failed; no request was issued
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Remote rejected the submitted markup (400 on a write)
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// Rate limited and the single automatic retry was exhausted (429)
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Server error persisted across the single automatic retry (5xx)
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The request did not complete within the configured deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A multi-step operation committed its first step and then failed
    #[error("partially applied: {step} failed: {source}")]
    PartiallyApplied {
        /// The step that did not commit
        step: MoveStep,
        /// Why that step failed
        #[source]
        source: Box<ThreadLoomError>,
    },

    /// Connection-level failure before any status code was received
    #[error("network error: {0}")]
    Network(String),

    /// Bad configuration or environment
    #[error("configuration error: {0}")]
    Config(String),

    /// Response decoding failures and other client-side bugs
    #[error("internal error: {0}")]
    Internal(String),
}

/// Steps of the two-phase move operation, named so callers can pick a
/// compensating action. The client itself never compensates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStep {
    /// Adding the thread to the target folder
    AddToTarget {
        /// Target folder id
        folder_id: String,
    },
    /// Removing the thread from the source folder
    RemoveFromSource {
        /// Source folder id
        folder_id: String,
    },
}

impl fmt::Display for MoveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddToTarget { folder_id } => write!(f, "add to folder {folder_id}"),
            Self::RemoveFromSource { folder_id } => {
                write!(f, "remove from folder {folder_id}")
            }
        }
    }
}

/// Categories of errors for caller-side handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential problems (401, 403)
    Auth,
    /// Unknown ids (404)
    NotFound,
    /// Rejected input, local or remote
    Validation,
    /// Rate limiting (429)
    RateLimit,
    /// Server-side failures (5xx)
    Server,
    /// Transport failures and timeouts
    Network,
    /// Configuration problems
    Config,
    /// Multi-step operation left remote state half-committed
    Partial,
    /// Client-side bugs
    Internal,
}

impl ThreadLoomError {
    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized(_) | Self::Forbidden(_) => ErrorCategory::Auth,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::InvalidRequest(_) | Self::InvalidContent(_) => ErrorCategory::Validation,
            Self::RateLimited(_) => ErrorCategory::RateLimit,
            Self::ServiceUnavailable(_) => ErrorCategory::Server,
            Self::Timeout(_) | Self::Network(_) => ErrorCategory::Network,
            Self::Config(_) => ErrorCategory::Config,
            Self::PartiallyApplied { .. } => ErrorCategory::Partial,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Whether a caller may reasonably retry the whole operation by hand.
    ///
    /// The client has already spent its single automatic retry by the time a
    /// `RateLimited` or `ServiceUnavailable` error surfaces. Nothing is
    /// idempotent at the transport layer, so deduplication on manual retry
    /// is the caller's responsibility.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Server | ErrorCategory::Network
        )
    }
}

/// Result type alias for ThreadLoom operations
pub type Result<T> = std::result::Result<T, ThreadLoomError>;
