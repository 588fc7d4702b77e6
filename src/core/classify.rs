//! Remote failure classification
//!
//! Every raw [`RemoteError`] is classified here, once, close to the point of
//! failure. The submitter, poller and table inspector branch on the resulting
//! [`ErrorClass`] and never look at status codes themselves.
//!
//! The HTTP status wins whenever it is decisive. Reason codes from the error
//! payload only decide when the status is missing or generic (400/403), which
//! is how the service reports rate limiting and backend hiccups.

use crate::domain::{ErrorClass, RemoteError, RemoteServiceError, Stage};

const REASON_NOT_FOUND: &[&str] = &["notFound"];
const REASON_ALREADY_EXISTS: &[&str] = &["duplicate", "alreadyExists"];
const REASON_TRANSIENT: &[&str] = &[
    "rateLimitExceeded",
    "backendError",
    "internalError",
    "jobBackendError",
    "jobInternalError",
];

/// Classify a remote failure
///
/// # Example
///
/// ```
/// use jobrelay::core::classify::classify;
/// use jobrelay::domain::{ErrorClass, RemoteError};
///
/// let conflict = RemoteError::http(409, "Already Exists: Job proj1:job-1").with_reason("duplicate");
/// assert_eq!(classify(&conflict), ErrorClass::AlreadyExists);
/// assert_eq!(classify(&RemoteError::http(404, "Not found")), ErrorClass::NotFound);
/// ```
pub fn classify(err: &RemoteError) -> ErrorClass {
    match err.status {
        Some(404) => return ErrorClass::NotFound,
        Some(409) => return ErrorClass::AlreadyExists,
        Some(408 | 429 | 500 | 502 | 503 | 504) => return ErrorClass::Transient,
        Some(_) => {}
        // No response at all: connect failure, reset or timeout
        None if err.reason.is_none() => return ErrorClass::Transient,
        None => {}
    }

    match err.reason.as_deref() {
        Some(reason) if REASON_NOT_FOUND.contains(&reason) && status_is_generic(err) => {
            ErrorClass::NotFound
        }
        Some(reason) if REASON_ALREADY_EXISTS.contains(&reason) && status_is_generic(err) => {
            ErrorClass::AlreadyExists
        }
        Some(reason) if REASON_TRANSIENT.contains(&reason) => ErrorClass::Transient,
        _ => ErrorClass::Fatal,
    }
}

/// Classify and attach the lifecycle stage in one step
pub fn classify_at(stage: Stage, err: RemoteError) -> RemoteServiceError {
    let class = classify(&err);
    RemoteServiceError::new(class, stage, err)
}

/// A reason code may only decide when the status is absent or a generic client error
fn status_is_generic(err: &RemoteError) -> bool {
    matches!(err.status, None | Some(400) | Some(403))
}
