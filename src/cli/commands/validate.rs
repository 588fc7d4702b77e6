//! Validate config command implementation

use crate::cli::exit_code;
use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates; a config that loads is a valid config.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let token = match &config.service.access_token {
            Some(token) if !token.expose_secret().is_empty() => "set",
            _ => "not set",
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Service: {}", config.service.base_url);
        println!("  Access Token: {token}");
        println!(
            "  Default Project: {}",
            config.service.default_project.as_deref().unwrap_or("(none)")
        );
        println!(
            "  Location: {}",
            config.service.location.as_deref().unwrap_or("(service default)")
        );
        println!("  Job ID Pattern: {}", config.jobs.id_pattern);
        println!("  Export Prefix: {}", config.jobs.export_prefix);
        println!("  Destination Format: {}", config.jobs.destination_format);
        println!(
            "  Polling: {}ms..{}ms x{} (max {} transient errors)",
            config.polling.initial_interval_ms,
            config.polling.max_interval_ms,
            config.polling.backoff_multiplier,
            config.polling.max_transient_errors
        );
        println!();

        Ok(exit_code::SUCCESS)
    }
}
