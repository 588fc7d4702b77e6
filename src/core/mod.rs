//! Core job coordination logic for jobrelay.
//!
//! # Modules
//!
//! - [`reference`] - Unique, service-legal job identities
//! - [`classify`] - Remote failure classification
//! - [`submit`] - Duplicate-safe submission
//! - [`poll`] - Cancellable completion polling
//! - [`export`] - Table-to-storage export workflow
//! - [`tables`] - Table inspection
//!
//! # Export Workflow
//!
//! 1. **Identify**: generate `{prefix}-{uuid}` in the target project
//! 2. **Submit**: create the job; "already exists" means a retry won the race,
//!    so fetch that job instead
//! 3. **Verify**: the returned job must carry the requested project and ID
//! 4. **Wait** (optional): fetch until DONE or ERROR, backing off between polls
//!
//! # Example
//!
//! ```rust,no_run
//! use jobrelay::adapters::warehouse::WarehouseClient;
//! use jobrelay::config::load_config;
//! use jobrelay::core::export::ExportOrchestrator;
//! use jobrelay::domain::{ProjectId, StorageUri};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("jobrelay.toml")?;
//! let client = Arc::new(WarehouseClient::new(&config.service)?);
//!
//! // Flip to true to stop waiting
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let orchestrator = ExportOrchestrator::new(client, &config, shutdown_rx)?;
//! let handle = orchestrator
//!     .export_to_storage(
//!         &ProjectId::new("proj1")?,
//!         &"proj1:sales.orders".parse()?,
//!         &[StorageUri::parse("gs://bucket/orders-*.json")?],
//!         false,
//!     )
//!     .await?;
//!
//! println!("Submitted {}", handle.reference);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod export;
pub mod poll;
pub mod reference;
pub mod submit;
pub mod tables;

pub use classify::classify;
pub use export::ExportOrchestrator;
pub use poll::{CompletionPoller, LivenessCallback, NoopLiveness, PollOutcome};
pub use reference::{JobIdRules, JobReferenceGenerator};
pub use submit::{check_job_identity, DuplicateSafeSubmitter, SubmitOutcome};
pub use tables::TableInspector;
