//! Configuration schema types
//!
//! This module defines the configuration structure that maps to the TOML file.
//! The job ID rules live here as named constants so that the generator, tests
//! and fakes receive them through configuration instead of global state.

use crate::config::SecretString;
use crate::domain::DestinationFormat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Job IDs must match this pattern
pub const JOB_ID_PATTERN: &str = "^[A-Za-z0-9_-]+$";

/// Maximum number of characters in a job ID
pub const JOB_ID_MAX_LENGTH: usize = 1024;

/// Prefix for job IDs issued by the export workflow
pub const DEFAULT_EXPORT_PREFIX: &str = "direct-export";

/// Default REST endpoint of the remote job service
pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Length of the `-{uuid}` suffix appended to a prefix
pub(crate) const JOB_ID_SUFFIX_LENGTH: usize = 37;

/// Shape of the suffix the generator appends, used to check prefixes
const SAMPLE_JOB_ID_SUFFIX: &str = "-00000000-0000-0000-0000-000000000000";

/// Largest accepted backoff multiplier for retries and polling
pub const MAX_BACKOFF_MULTIPLIER: f64 = 10.0;

/// Main jobrelay configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobRelayConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote job service connection
    pub service: ServiceConfig,

    /// Job identity and export settings
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Completion polling settings
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JobRelayConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.service.validate()?;
        self.jobs.validate()?;
        self.polling.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Transport retry configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt of a request
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "service.retry.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }
        validate_multiplier("service.retry.backoff_multiplier", self.backoff_multiplier)?;
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Remote job service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the REST API (e.g. `https://bigquery.googleapis.com/bigquery/v2`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Pre-issued bearer token; acquiring one is out of scope
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub access_token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Processing location passed on job lookups (e.g. "EU")
    #[serde(default)]
    pub location: Option<String>,

    /// Project used when the CLI is not given one
    #[serde(default)]
    pub default_project: Option<String>,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ServiceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("service.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("service.base_url must start with http:// or https://".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("service.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            timeout_seconds: default_timeout_seconds(),
            location: None,
            default_project: None,
            retry: RetryConfig::default(),
        }
    }
}

/// Job identity rules and export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Pattern every job ID (and prefix) must match
    #[serde(default = "default_id_pattern")]
    pub id_pattern: String,

    /// Maximum job ID length in characters
    #[serde(default = "default_id_max_length")]
    pub id_max_length: usize,

    /// Prefix of job IDs issued by the export workflow
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,

    /// Output format of export jobs
    #[serde(default)]
    pub destination_format: DestinationFormat,
}

impl JobsConfig {
    fn validate(&self) -> Result<(), String> {
        let pattern = Regex::new(&format!("^(?:{})$", self.id_pattern)).map_err(|e| {
            format!("jobs.id_pattern '{}' is not a valid regex: {e}", self.id_pattern)
        })?;

        if self.id_max_length == 0 {
            return Err("jobs.id_max_length must be > 0".to_string());
        }

        if !pattern.is_match(&self.export_prefix) {
            return Err(format!(
                "jobs.export_prefix '{}' must match pattern '{}'",
                self.export_prefix, self.id_pattern
            ));
        }

        let sample = format!("{}{SAMPLE_JOB_ID_SUFFIX}", self.export_prefix);
        if !pattern.is_match(&sample) {
            return Err(format!(
                "jobs.id_pattern '{}' rejects generated ids such as '{sample}'",
                self.id_pattern
            ));
        }

        if self.export_prefix.chars().count() + JOB_ID_SUFFIX_LENGTH > self.id_max_length {
            return Err(format!(
                "jobs.export_prefix '{}' leaves no room for the unique suffix within {} characters",
                self.export_prefix, self.id_max_length
            ));
        }

        Ok(())
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            id_pattern: default_id_pattern(),
            id_max_length: default_id_max_length(),
            export_prefix: default_export_prefix(),
            destination_format: DestinationFormat::default(),
        }
    }
}

/// Completion polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay after the first non-terminal fetch, in milliseconds
    #[serde(default = "default_poll_initial_interval_ms")]
    pub initial_interval_ms: u64,

    /// Upper bound on the delay between fetches, in milliseconds
    #[serde(default = "default_poll_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Delay growth per non-terminal fetch; 1.0 polls at a fixed cadence
    #[serde(default = "default_poll_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Consecutive transient fetch errors tolerated before giving up
    #[serde(default = "default_max_transient_errors")]
    pub max_transient_errors: u32,
}

impl PollingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.initial_interval_ms == 0 {
            return Err("polling.initial_interval_ms must be > 0".to_string());
        }
        if self.max_interval_ms < self.initial_interval_ms {
            return Err(format!(
                "polling.max_interval_ms ({}) must be >= polling.initial_interval_ms ({})",
                self.max_interval_ms, self.initial_interval_ms
            ));
        }
        validate_multiplier("polling.backoff_multiplier", self.backoff_multiplier)?;
        Ok(())
    }

    /// First sleep between fetches
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    /// Longest sleep between fetches
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_poll_initial_interval_ms(),
            max_interval_ms: default_poll_max_interval_ms(),
            backoff_multiplier: default_poll_backoff_multiplier(),
            max_transient_errors: default_max_transient_errors(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_multiplier(key: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || !(1.0..=MAX_BACKOFF_MULTIPLIER).contains(&value) {
        return Err(format!(
            "{key} must be between 1.0 and {MAX_BACKOFF_MULTIPLIER}, got {value}"
        ));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_id_pattern() -> String {
    JOB_ID_PATTERN.to_string()
}

fn default_id_max_length() -> usize {
    JOB_ID_MAX_LENGTH
}

fn default_export_prefix() -> String {
    DEFAULT_EXPORT_PREFIX.to_string()
}

fn default_poll_initial_interval_ms() -> u64 {
    1000
}

fn default_poll_max_interval_ms() -> u64 {
    10000
}

fn default_poll_backoff_multiplier() -> f64 {
    1.5
}

fn default_max_transient_errors() -> u32 {
    3
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = JobRelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jobs.id_max_length, JOB_ID_MAX_LENGTH);
        assert_eq!(config.jobs.export_prefix, DEFAULT_EXPORT_PREFIX);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = JobRelayConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().unwrap_err().contains("log_level"));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let mut config = JobRelayConfig::default();
        config.service.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_prefix_must_match_pattern() {
        let mut config = JobRelayConfig::default();
        config.jobs.export_prefix = "bad id!".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("export_prefix"));
    }

    #[test]
    fn test_export_prefix_must_leave_room_for_suffix() {
        let mut config = JobRelayConfig::default();
        config.jobs.id_max_length = 40;
        config.jobs.export_prefix = "abcd".to_string();
        assert!(config.validate().is_err());

        config.jobs.export_prefix = "abc".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_id_pattern() {
        let mut config = JobRelayConfig::default();
        config.jobs.id_pattern = "[unclosed".to_string();
        assert!(config.validate().unwrap_err().contains("not a valid regex"));
    }

    #[test]
    fn test_polling_interval_bounds() {
        let mut config = JobRelayConfig::default();
        config.polling.max_interval_ms = 10;
        config.polling.initial_interval_ms = 100;
        assert!(config.validate().is_err());

        config.polling.max_interval_ms = 100;
        config.polling.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_multiplier_must_be_finite_and_bounded() {
        for value in [f64::NAN, f64::INFINITY, 1e300, 10.5] {
            let mut config = JobRelayConfig::default();
            config.polling.backoff_multiplier = value;
            let err = config.validate().unwrap_err();
            assert!(err.contains("polling.backoff_multiplier"), "{value}: {err}");

            let mut config = JobRelayConfig::default();
            config.service.retry.backoff_multiplier = value;
            let err = config.validate().unwrap_err();
            assert!(err.contains("service.retry.backoff_multiplier"), "{value}: {err}");
        }

        let mut config = JobRelayConfig::default();
        config.polling.backoff_multiplier = MAX_BACKOFF_MULTIPLIER;
        config.service.retry.backoff_multiplier = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_id_pattern_must_accept_generated_suffix() {
        let mut config = JobRelayConfig::default();
        config.jobs.id_pattern = "[a-z0-9_]+".to_string();
        config.jobs.export_prefix = "nightly_export".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("rejects generated ids"), "{err}");

        config.jobs.id_pattern = "[a-z0-9_-]+".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_polling_durations() {
        let polling = PollingConfig::default();
        assert_eq!(polling.initial_interval(), Duration::from_millis(1000));
        assert_eq!(polling.max_interval(), Duration::from_millis(10000));
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut config = JobRelayConfig::default();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
