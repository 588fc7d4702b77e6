//! Configuration management for jobrelay.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `JOBRELAY_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ServiceConfig`] - Remote job service endpoint, token, timeouts, transport retry
//! - [`JobsConfig`] - Job ID rules, export prefix and output format
//! - [`PollingConfig`] - Completion polling cadence and transient error budget
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [service]
//! base_url = "https://bigquery.googleapis.com/bigquery/v2"
//! access_token = "${JOBRELAY_TOKEN}"
//! default_project = "analytics-prod"
//!
//! [jobs]
//! export_prefix = "direct-export"
//! destination_format = "NEWLINE_DELIMITED_JSON"
//!
//! [polling]
//! initial_interval_ms = 1000
//! max_interval_ms = 10000
//! backoff_multiplier = 1.5
//! max_transient_errors = 3
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jobrelay::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("jobrelay.toml")?;
//! println!("Service: {}", config.service.base_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, JobRelayConfig, JobsConfig, LoggingConfig, PollingConfig, RetryConfig,
    ServiceConfig, DEFAULT_BASE_URL, DEFAULT_EXPORT_PREFIX, JOB_ID_MAX_LENGTH, JOB_ID_PATTERN,
    MAX_BACKOFF_MULTIPLIER,
};
pub use secret::{secret_string, SecretString, SecretValue};
