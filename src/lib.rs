// jobrelay - Duplicate-safe remote job submission and tracking
// Copyright (c) 2025 jobrelay Contributors
// Licensed under the MIT License

//! # jobrelay - duplicate-safe remote job coordination
//!
//! jobrelay submits asynchronous jobs to a remote warehouse service and waits
//! for them to finish, safely under retries and concurrent submitters.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Identifying** jobs with globally unique, service-legal IDs
//! - **Submitting** jobs so that a resubmission resolves to the same job
//! - **Waiting** for completion with backoff, cancellation and a liveness hook
//! - **Exporting** tables to object storage as a single call
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Identity, classification, submission, polling, export
//! - [`adapters`] - Remote service traits and the REST client
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobrelay::adapters::warehouse::WarehouseClient;
//! use jobrelay::config::load_config;
//! use jobrelay::core::ExportOrchestrator;
//! use jobrelay::domain::{ProjectId, StorageUri};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("jobrelay.toml")?;
//!     let client = Arc::new(WarehouseClient::new(&config.service)?);
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let orchestrator = ExportOrchestrator::new(client, &config, shutdown_rx)?;
//!     let handle = orchestrator
//!         .export_to_storage(
//!             &ProjectId::new("proj1")?,
//!             &"proj1:sales.orders".parse()?,
//!             &[StorageUri::parse("gs://exports/orders-*.json")?],
//!             true,
//!         )
//!         .await?;
//!
//!     println!("{} is {}", handle.reference, handle.state);
//!     Ok(())
//! }
//! ```
//!
//! ## Duplicate-safe submission
//!
//! The remote service rejects a second job with an ID it already knows.
//! [`core::DuplicateSafeSubmitter`] turns that rejection into a lookup, so a
//! retried or raced submission still yields the one job that exists:
//!
//! ```rust,no_run
//! use jobrelay::adapters::warehouse::WarehouseClient;
//! use jobrelay::core::{DuplicateSafeSubmitter, SubmitOutcome};
//! use jobrelay::domain::{JobDescription, ProjectId};
//! use std::sync::Arc;
//!
//! # async fn example(client: Arc<WarehouseClient>, job: JobDescription) -> jobrelay::domain::Result<()> {
//! let submitter = DuplicateSafeSubmitter::new(client);
//! let project = ProjectId::new("proj1").map_err(jobrelay::domain::JobRelayError::InvalidArgument)?;
//! match submitter.submit_classified(&project, &job).await? {
//!     SubmitOutcome::Created(handle) => println!("created {}", handle.reference),
//!     SubmitOutcome::Duplicate(handle) => println!("already running {}", handle.reference),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every remote failure is classified once into an
//! [`domain::ErrorClass`] and tagged with the [`domain::Stage`] it happened
//! in, so callers can tell "never started" from "started but failed":
//!
//! ```rust,no_run
//! use jobrelay::domain::{JobRelayError, Stage};
//!
//! fn describe(err: &JobRelayError) -> &'static str {
//!     match err.as_remote().map(|r| r.stage) {
//!         Some(Stage::Submission) => "job never started",
//!         Some(Stage::Execution) => "job failed",
//!         Some(_) => "job state unknown",
//!         None => "local error",
//!     }
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
