//! Failure taxonomy used by the default retry predicate
//!
//! Operations report failures through their own error types. Any type that
//! implements [`Classify`] can be mapped onto a [`FailureKind`], which decides
//! whether the failure is transient (retryable) or terminal.

use std::fmt;

/// Closed set of failure kinds an operation can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport-level failure with no status code (DNS, connect, reset)
    Network,
    /// Request timed out (HTTP 408 or a client-side timeout)
    Timeout,
    /// Rate limited by the backend (HTTP 429)
    RateLimited,
    /// Backend failure (HTTP 5xx)
    Server(u16),
    /// Rejected by the backend (HTTP 4xx other than 408/429)
    Client(u16),
    /// Input failed validation before or after the call
    Validation,
    /// Any other application-level failure
    Application,
}

impl FailureKind {
    /// Map an HTTP status code onto a failure kind
    pub fn from_status(status: u16) -> Self {
        match status {
            408 => Self::Timeout,
            429 => Self::RateLimited,
            500.. => Self::Server(status),
            400..=499 => Self::Client(status),
            _ => Self::Application,
        }
    }

    /// Transient failures are retried, everything else is terminal
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimited | Self::Server(_)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Server(_) => "server",
            Self::Client(_) => "client",
            Self::Validation => "validation",
            Self::Application => "application",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(status) | Self::Client(status) => {
                write!(f, "{} ({})", self.as_str(), status)
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

/// Error types that can tell the retry loop what kind of failure they are
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;
}

/// General purpose error for network-backed operations
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OperationError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Status code, if the failure came back from the backend
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Timeout => Some(408),
            _ => None,
        }
    }
}

impl Classify for OperationError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Http { status, .. } => FailureKind::from_status(*status),
            Self::Network(_) => FailureKind::Network,
            Self::Timeout => FailureKind::Timeout,
            Self::Validation(_) => FailureKind::Validation,
            Self::Other(e) => e.failure_kind(),
        }
    }
}

impl Classify for anyhow::Error {
    fn failure_kind(&self) -> FailureKind {
        if let Some(op) = self.downcast_ref::<OperationError>() {
            return op.failure_kind();
        }
        if self.downcast_ref::<tokio::time::error::Elapsed>().is_some() {
            return FailureKind::Timeout;
        }
        // Another process holds the progression database
        if let Some(rusqlite::Error::SqliteFailure(e, _)) = self.downcast_ref::<rusqlite::Error>() {
            if matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) {
                return FailureKind::Timeout;
            }
        }
        match self.downcast_ref::<std::io::Error>().map(|e| e.kind()) {
            Some(
                std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected
                | std::io::ErrorKind::BrokenPipe,
            ) => FailureKind::Network,
            Some(std::io::ErrorKind::TimedOut) => FailureKind::Timeout,
            _ => FailureKind::Application,
        }
    }
}
