//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::JobRelayConfig;
use super::secret::secret_string;
use crate::domain::errors::JobRelayError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into JobRelayConfig
/// 4. Applies environment variable overrides (JOBRELAY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns `JobRelayError::Configuration` if the file cannot be read, a
/// referenced variable is unset, parsing fails or validation fails.
///
/// # Examples
///
/// ```no_run
/// use jobrelay::config::loader::load_config;
///
/// let config = load_config("jobrelay.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<JobRelayConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(JobRelayError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        JobRelayError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<JobRelayConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: JobRelayConfig = toml::from_str(&contents)
        .map_err(|e| JobRelayError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        JobRelayError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. Every missing variable is reported at once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| JobRelayError::Configuration(format!("Invalid substitution regex: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(JobRelayError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the JOBRELAY_* prefix
///
/// Variables follow the pattern JOBRELAY_<SECTION>_<KEY>, for example
/// JOBRELAY_SERVICE_BASE_URL or JOBRELAY_POLLING_INITIAL_INTERVAL_MS.
fn apply_env_overrides(config: &mut JobRelayConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("JOBRELAY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Service overrides
    if let Ok(val) = std::env::var("JOBRELAY_SERVICE_BASE_URL") {
        config.service.base_url = val;
    }
    if let Ok(val) = std::env::var("JOBRELAY_SERVICE_ACCESS_TOKEN") {
        config.service.access_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("JOBRELAY_SERVICE_LOCATION") {
        config.service.location = Some(val);
    }
    if let Ok(val) = std::env::var("JOBRELAY_SERVICE_DEFAULT_PROJECT") {
        config.service.default_project = Some(val);
    }
    if let Ok(val) = std::env::var("JOBRELAY_SERVICE_TIMEOUT_SECONDS") {
        config.service.timeout_seconds = parse_override("JOBRELAY_SERVICE_TIMEOUT_SECONDS", &val)?;
    }

    // Jobs overrides
    if let Ok(val) = std::env::var("JOBRELAY_JOBS_EXPORT_PREFIX") {
        config.jobs.export_prefix = val;
    }
    if let Ok(val) = std::env::var("JOBRELAY_JOBS_DESTINATION_FORMAT") {
        config.jobs.destination_format = val.parse().map_err(JobRelayError::Configuration)?;
    }

    // Polling overrides
    if let Ok(val) = std::env::var("JOBRELAY_POLLING_INITIAL_INTERVAL_MS") {
        config.polling.initial_interval_ms =
            parse_override("JOBRELAY_POLLING_INITIAL_INTERVAL_MS", &val)?;
    }
    if let Ok(val) = std::env::var("JOBRELAY_POLLING_MAX_INTERVAL_MS") {
        config.polling.max_interval_ms = parse_override("JOBRELAY_POLLING_MAX_INTERVAL_MS", &val)?;
    }
    if let Ok(val) = std::env::var("JOBRELAY_POLLING_MAX_TRANSIENT_ERRORS") {
        config.polling.max_transient_errors =
            parse_override("JOBRELAY_POLLING_MAX_TRANSIENT_ERRORS", &val)?;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("JOBRELAY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("JOBRELAY_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("JOBRELAY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        JobRelayError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}
