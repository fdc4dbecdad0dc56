use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ServiceError: failure reason reported by the database service
// ---------------------------------------------------------------------------

/// Classification of a service-side failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorCode {
    PermissionDenied,
    Disconnected,
    Unavailable,
    WriteCanceled,
    InvalidToken,
    OperationFailed,
    Unknown,
}

impl ServiceErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::Disconnected => "disconnected",
            Self::Unavailable => "unavailable",
            Self::WriteCanceled => "write-canceled",
            Self::InvalidToken => "invalid-token",
            Self::OperationFailed => "operation-failed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reason a service operation failed or a listener was revoked.
///
/// Carried through the bridges unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub code: ServiceErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ServiceError {
    pub fn new(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn permission_denied(path: &str) -> Self {
        Self::new(
            ServiceErrorCode::PermissionDenied,
            format!("Client doesn't have permission to access {path}"),
        )
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

// ---------------------------------------------------------------------------
// RealtimeError: top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The wrapped asynchronous operation resolved unsuccessfully.
    #[error("Operation failed: {0}")]
    Operation(ServiceError),

    /// The service revoked a registered listener.
    #[error("Listener cancelled: {0}")]
    ListenerCancelled(ServiceError),

    #[error("Failed to decode snapshot at \"{path}\": {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid database path \"{0}\"")]
    InvalidPath(String),

    #[error("No data at \"{0}\"")]
    NotFound(String),
}

impl RealtimeError {
    /// The service-supplied reason, for operation failures and revoked
    /// listeners.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Operation(e) | Self::ListenerCancelled(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience alias with `RealtimeError` as the default error type.
pub type Result<T, E = RealtimeError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
