//! Export command implementation
//!
//! Exports a table to one or more object storage URIs and, unless told not
//! to, waits for the job to finish.

use crate::adapters::warehouse::WarehouseClient;
use crate::cli::{exit_code, exit_code_for, resolve_project};
use crate::config::load_config;
use crate::core::export::ExportOrchestrator;
use crate::domain::{StorageUri, TableReference};
use crate::log_error_with_context;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project that runs the job (defaults to service.default_project)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Source table as `project:dataset.table` or `project.dataset.table`
    #[arg(short, long)]
    pub table: String,

    /// Destination URI, e.g. `gs://bucket/orders-*.json` (repeatable)
    #[arg(short, long = "destination", required = true)]
    pub destination: Vec<String>,

    /// Return as soon as the job is accepted
    #[arg(long)]
    pub no_wait: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
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

        let source: TableReference = match self.table.parse() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Invalid --table: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let mut destinations = Vec::with_capacity(self.destination.len());
        for raw in &self.destination {
            match StorageUri::parse(raw) {
                Ok(uri) => destinations.push(uri),
                Err(e) => {
                    eprintln!("Invalid --destination: {e}");
                    return Ok(exit_code::CONFIGURATION);
                }
            }
        }

        let client = Arc::new(WarehouseClient::new(&config.service)?);
        let orchestrator = ExportOrchestrator::new(client, &config, shutdown_signal)?;

        let mut polls: u64 = 0;
        let mut report_progress = || {
            polls += 1;
            tracing::debug!(polls = polls, "Still waiting for export job");
        };

        println!("Exporting {source} to {} destination(s)...", destinations.len());

        let result = orchestrator
            .export_to_storage_with_liveness(
                &project,
                &source,
                &destinations,
                !self.no_wait,
                &mut report_progress,
            )
            .await;

        match result {
            Ok(handle) => {
                if self.no_wait {
                    println!("Submitted job {} ({})", handle.reference, handle.state);
                } else {
                    println!("Export job {} finished: {}", handle.reference, handle.state);
                }
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                log_error_with_context!(&e, "Export failed");
                eprintln!("Export failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}
