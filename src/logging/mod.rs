//! Logging and observability
//!
//! Structured logging through `tracing`, with:
//! - Configurable log levels (`RUST_LOG` overrides the configured level)
//! - Local JSON file logging with rotation
//! - Helper macros for the job lifecycle events every command logs
//!
//! # Example
//!
//! ```no_run
//! use jobrelay::logging::init_logging;
//! use jobrelay::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a job submission
///
/// # Example
///
/// ```no_run
/// use jobrelay::log_job_submitted;
///
/// log_job_submitted!("proj1", "direct-export-1234", "extract");
/// ```
#[macro_export]
macro_rules! log_job_submitted {
    ($project_id:expr, $job_id:expr, $kind:expr) => {
        tracing::info!(
            project_id = %$project_id,
            job_id = %$job_id,
            kind = $kind,
            "Job submitted"
        );
    };
}

/// Log a job reaching a terminal state
///
/// # Example
///
/// ```no_run
/// use jobrelay::log_job_completed;
/// use std::time::Duration;
///
/// log_job_completed!("direct-export-1234", "DONE", Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_job_completed {
    ($job_id:expr, $state:expr, $duration:expr) => {
        tracing::info!(
            job_id = %$job_id,
            state = %$state,
            duration_ms = $duration.as_millis() as u64,
            "Job finished"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use jobrelay::log_error_with_context;
/// use jobrelay::domain::JobRelayError;
///
/// let error = JobRelayError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use jobrelay::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "503 backend unavailable");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying operation"
        );
    };
}
