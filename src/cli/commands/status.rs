//! Status command implementation
//!
//! Fetches one job by identity and prints its state.

use crate::adapters::warehouse::WarehouseClient;
use crate::cli::{exit_code, exit_code_for, resolve_project};
use crate::config::load_config;
use crate::core::poll::CompletionPoller;
use crate::domain::{JobHandle, JobId, JobReference};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project that owns the job (defaults to service.default_project)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Job ID to look up
    #[arg(short, long)]
    pub job_id: String,

    /// Processing location (defaults to service.location)
    #[arg(long)]
    pub location: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let project = match resolve_project(self.project.as_deref(), &config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let job_id = match JobId::new(self.job_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid --job-id: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let mut reference = JobReference::new(project.clone(), job_id);
        reference.location = self
            .location
            .clone()
            .or_else(|| config.service.location.clone());

        let client = Arc::new(WarehouseClient::new(&config.service)?);
        let poller = CompletionPoller::new(client, config.polling.clone());

        match poller.fetch_status(&project, &reference).await {
            Ok(handle) => {
                print_status(&handle);
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, job = %reference, "Failed to fetch job status");
                eprintln!("Failed to fetch job status: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

fn print_status(handle: &JobHandle) {
    println!("Job:   {}", handle.reference);
    if let Some(location) = &handle.reference.location {
        println!("Location: {location}");
    }
    println!("State: {}", handle.state);

    if let Some(stats) = &handle.statistics {
        if let Some(created) = stats.creation_time {
            println!("Created:  {}", created.to_rfc3339());
        }
        if let Some(started) = stats.start_time {
            println!("Started:  {}", started.to_rfc3339());
        }
        if let Some(ended) = stats.end_time {
            println!("Ended:    {}", ended.to_rfc3339());
        }
    }

    if let Some(error) = &handle.error_result {
        println!("Error: {error}");
    }
    for detail in &handle.errors {
        println!("  - {detail}");
    }
}
