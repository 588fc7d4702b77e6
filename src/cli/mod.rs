//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for jobrelay using clap.

pub mod commands;

use crate::config::JobRelayConfig;
use crate::domain::{JobRelayError, ProjectId, Stage};
use clap::{Parser, Subcommand};

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    /// The job ran and finished in ERROR
    pub const JOB_FAILED: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    /// The service rejected a request or could not be reached
    pub const REMOTE: i32 = 4;
    pub const FATAL: i32 = 5;
    pub const CANCELLED: i32 = 130;
}

/// jobrelay - submit and track remote warehouse jobs
#[derive(Parser, Debug)]
#[command(name = "jobrelay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "jobrelay.toml", env = "JOBRELAY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "JOBRELAY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a table to object storage
    Export(commands::export::ExportArgs),

    /// Show the current state of a job
    Status(commands::status::StatusArgs),

    /// Describe a table
    Table(commands::table::TableArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

/// Map a library error to the process exit code
pub fn exit_code_for(err: &JobRelayError) -> i32 {
    match err {
        JobRelayError::Cancelled { .. } => exit_code::CANCELLED,
        JobRelayError::Remote(remote) if remote.stage == Stage::Execution => {
            exit_code::JOB_FAILED
        }
        JobRelayError::Remote(_) => exit_code::REMOTE,
        JobRelayError::Configuration(_) | JobRelayError::InvalidArgument(_) => {
            exit_code::CONFIGURATION
        }
        JobRelayError::Integrity { .. }
        | JobRelayError::Io(_)
        | JobRelayError::Serialization(_) => exit_code::FATAL,
    }
}

/// Project from the command line, falling back to `service.default_project`
pub(crate) fn resolve_project(
    arg: Option<&str>,
    config: &JobRelayConfig,
) -> Result<ProjectId, JobRelayError> {
    let project = arg
        .or(config.service.default_project.as_deref())
        .ok_or_else(|| {
            JobRelayError::InvalidArgument(
                "no project given: pass --project or set service.default_project".to_string(),
            )
        })?;
    ProjectId::new(project).map_err(JobRelayError::InvalidArgument)
}
