//! Error types for broker operations.

use thiserror::Error;

/// Why a request was declined without ever waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    /// The resource id is outside `[1, resource_count]`.
    Unknown,
    /// The resource has been permanently deleted.
    Deleted,
}

impl std::fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unknown => "does not exist",
            Self::Deleted => "deleted",
        })
    }
}

/// Why an admission attempt ended without an access window.
///
/// These are the only two ways admission can fail; both are per-request
/// outcomes, never run-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The resource is unknown or deleted. The request is declined.
    #[error("resource {resource_id} {reason}")]
    InvalidResource {
        /// Requested resource id as it appeared in the input.
        resource_id: i64,
        /// Unknown or deleted.
        reason: DeclineReason,
    },
    /// The deadline passed first. The request is cancelled.
    #[error("admission timed out")]
    Timeout,
}

/// Errors produced by broker components.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Startup configuration is missing or malformed. Fatal.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A request line could not be parsed; the line is skipped.
    #[error("malformed request: {reason}")]
    Parse {
        /// What was wrong with the line.
        reason: String,
    },
    /// The request targets a resource that does not exist or is deleted.
    #[error("invalid resource {resource_id}: {reason}")]
    InvalidResource {
        /// Requested resource id as it appeared in the input.
        resource_id: i64,
        /// Unknown or deleted.
        reason: DeclineReason,
    },
    /// The admission predicate never held before the request's deadline.
    #[error("admission timed out")]
    AdmissionTimeout,
    /// Input or output failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AdmissionError> for BrokerError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::InvalidResource {
                resource_id,
                reason,
            } => Self::InvalidResource {
                resource_id,
                reason,
            },
            AdmissionError::Timeout => Self::AdmissionTimeout,
        }
    }
}

impl BrokerError {
    /// Build a parse error from anything displayable.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the whole run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Io(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
