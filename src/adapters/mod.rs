//! External system integrations for jobrelay.
//!
//! - [`warehouse`] - Remote job service: traits plus the REST client
//!
//! # Design Pattern
//!
//! The core layer only talks to the [`warehouse::RemoteJobService`] and
//! [`warehouse::TableService`] traits. [`warehouse::WarehouseClient`] is the
//! production implementation; tests substitute in-memory fakes.
//!
//! ```rust,no_run
//! use jobrelay::adapters::warehouse::{RemoteJobService, WarehouseClient};
//! use jobrelay::config::{secret_string, ServiceConfig};
//! use jobrelay::domain::{JobId, ProjectId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig {
//!     access_token: Some(secret_string("ya29.token".to_string())),
//!     ..ServiceConfig::default()
//! };
//! let client = WarehouseClient::new(&config)?;
//!
//! let job = client
//!     .get_job(&ProjectId::new("proj1")?, &JobId::new("direct-export-1")?, Some("EU"))
//!     .await?;
//! println!("{}", job.state);
//! # Ok(())
//! # }
//! ```

pub mod warehouse;
