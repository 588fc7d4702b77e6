//! Domain error types
//!
//! This module defines the error hierarchy for jobrelay. Remote failures are
//! classified exactly once (see [`crate::core::classify`]) and carried upward
//! as a [`RemoteServiceError`] so that callers match on [`ErrorClass`] instead
//! of re-inspecting transport details.

use super::job::JobReference;
use std::fmt;
use thiserror::Error;

/// Main jobrelay error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum JobRelayError {
    /// Malformed identity, prefix or request; a caller bug, never retried
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The remote service answered for a different job than the one requested
    #[error("Integrity error: job identities must match (expected '{expected}', got '{actual}')")]
    Integrity {
        expected: Box<JobReference>,
        actual: Box<JobReference>,
    },

    /// Classified failure reported by the remote job service
    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteServiceError),

    /// Cooperative abort while waiting for a job to finish
    #[error("Cancelled while waiting for job '{job_id}'")]
    Cancelled { job_id: String },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl JobRelayError {
    /// Returns the remote error, if this is one
    pub fn as_remote(&self) -> Option<&RemoteServiceError> {
        match self {
            JobRelayError::Remote(err) => Some(err),
            _ => None,
        }
    }

    /// True if the failure happened before the remote service accepted the job
    pub fn is_job_never_started(&self) -> bool {
        match self {
            JobRelayError::InvalidArgument(_) | JobRelayError::Configuration(_) => true,
            JobRelayError::Remote(err) => err.stage == Stage::Submission,
            _ => false,
        }
    }
}

/// Outcome of classifying a remote failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The addressed resource does not exist (HTTP 404)
    NotFound,
    /// A resource with the same identity already exists (HTTP 409)
    AlreadyExists,
    /// Worth retrying: throttling, 5xx, dropped connections, timeouts
    Transient,
    /// Anything else
    Fatal,
}

impl ErrorClass {
    /// Whether a bounded retry may succeed
    pub fn is_transient(self) -> bool {
        self == ErrorClass::Transient
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::NotFound => "not-found",
            ErrorClass::AlreadyExists => "already-exists",
            ErrorClass::Transient => "transient",
            ErrorClass::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Where in the job lifecycle a remote failure surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Creating the job (or fetching its duplicate); the job may never have started
    Submission,
    /// Fetching the status of an accepted job
    Polling,
    /// The job itself finished in the ERROR state
    Execution,
    /// Reading a resource outside any job, e.g. a table description
    Inspection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Submission => "submission",
            Stage::Polling => "polling",
            Stage::Execution => "execution",
            Stage::Inspection => "inspection",
        };
        f.write_str(name)
    }
}

/// A classified remote failure together with its original cause
#[derive(Debug, Clone, Error)]
#[error("{class} failure during {stage}: {cause}")]
pub struct RemoteServiceError {
    /// Classifier verdict
    pub class: ErrorClass,

    /// Lifecycle stage the failure belongs to
    pub stage: Stage,

    /// Raw failure as reported by the service
    #[source]
    pub cause: RemoteError,
}

impl RemoteServiceError {
    /// Creates a new classified remote error
    pub fn new(class: ErrorClass, stage: Stage, cause: RemoteError) -> Self {
        Self {
            class,
            stage,
            cause,
        }
    }
}

/// Raw, unclassified failure from the remote job service
///
/// Carries the structured pieces of the service's failure payload: the HTTP
/// status (absent for transport failures), the service's reason code and a
/// human readable message. These errors don't expose third-party HTTP client
/// types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct RemoteError {
    /// HTTP status code, `None` when the request never got a response
    pub status: Option<u16>,

    /// Service reason code (e.g. `notFound`, `duplicate`, `backendError`)
    pub reason: Option<String>,

    /// Error message
    pub message: String,
}

impl RemoteError {
    /// Failure reported with an HTTP status
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reason: None,
            message: message.into(),
        }
    }

    /// Failure before any response was received (connect, timeout, reset)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            reason: None,
            message: message.into(),
        }
    }

    /// Sets the service reason code
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.reason) {
            (Some(status), Some(reason)) => write!(f, "{status} [{reason}] {}", self.message),
            (Some(status), None) => write!(f, "{status} {}", self.message),
            (None, Some(reason)) => write!(f, "[{reason}] {}", self.message),
            (None, None) => write!(f, "transport: {}", self.message),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for JobRelayError {
    fn from(err: std::io::Error) -> Self {
        JobRelayError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for JobRelayError {
    fn from(err: serde_json::Error) -> Self {
        JobRelayError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for JobRelayError {
    fn from(err: toml::de::Error) -> Self {
        JobRelayError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jobrelay_error_display() {
        let err = JobRelayError::InvalidArgument("prefix is empty".to_string());
        assert_eq!(err.to_string(), "Invalid argument: prefix is empty");
    }

    #[test]
    fn test_remote_service_error_conversion() {
        let remote = RemoteServiceError::new(
            ErrorClass::Fatal,
            Stage::Execution,
            RemoteError::http(400, "bad destination").with_reason("invalid"),
        );
        let err: JobRelayError = remote.into();
        assert!(matches!(err, JobRelayError::Remote(_)));
        assert_eq!(err.as_remote().map(|e| e.class), Some(ErrorClass::Fatal));
    }

    #[test]
    fn test_remote_error_display_variants() {
        assert_eq!(
            RemoteError::http(409, "Already Exists")
                .with_reason("duplicate")
                .to_string(),
            "409 [duplicate] Already Exists"
        );
        assert_eq!(RemoteError::http(503, "down").to_string(), "503 down");
        assert_eq!(
            RemoteError::transport("connection reset").to_string(),
            "transport: connection reset"
        );
    }

    #[test]
    fn test_never_started_distinguishes_stages() {
        let submission: JobRelayError = RemoteServiceError::new(
            ErrorClass::Fatal,
            Stage::Submission,
            RemoteError::http(403, "denied"),
        )
        .into();
        let execution: JobRelayError = RemoteServiceError::new(
            ErrorClass::Fatal,
            Stage::Execution,
            RemoteError::transport("job failed"),
        )
        .into();
        let cancelled = JobRelayError::Cancelled {
            job_id: "direct-export-1".to_string(),
        };

        assert!(submission.is_job_never_started());
        assert!(!execution.is_job_never_started());
        assert!(!cancelled.is_job_never_started());
    }

    #[test]
    fn test_error_class_transient() {
        assert!(ErrorClass::Transient.is_transient());
        assert!(!ErrorClass::Fatal.is_transient());
        assert!(!ErrorClass::NotFound.is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: JobRelayError = io_err.into();
        assert!(matches!(err, JobRelayError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: JobRelayError = json_err.into();
        assert!(matches!(err, JobRelayError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: JobRelayError = toml_err.into();
        assert!(matches!(err, JobRelayError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
