//! Domain models and types for jobrelay.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProjectId`], [`JobId`], [`JobReference`])
//! - **Job models** ([`JobDescription`], [`JobHandle`], [`JobState`])
//! - **Table models** ([`TableReference`], [`Table`], [`TableSchema`])
//! - **Error types** ([`JobRelayError`], [`RemoteServiceError`], [`RemoteError`])
//! - **Result type alias** ([`Result`])
//!
//! # Snapshots, not live objects
//!
//! A [`JobHandle`] is whatever the service returned on the last fetch. Nothing
//! in this crate mutates one; to learn the current state, fetch again.
//!
//! ```rust
//! use jobrelay::domain::{JobHandle, JobId, JobReference, JobState, ProjectId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reference = JobReference::new(ProjectId::new("proj1")?, JobId::new("direct-export-1")?);
//! let handle = JobHandle::new(reference, JobState::Pending);
//! assert!(!handle.is_terminal());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod job;
pub mod result;
pub mod table;

// Re-export commonly used types for convenience
pub use errors::{ErrorClass, JobRelayError, RemoteError, RemoteServiceError, Stage};
pub use ids::{JobId, ProjectId};
pub use job::{
    DestinationFormat, ExtractConfig, JobConfiguration, JobDescription, JobErrorDetail,
    JobHandle, JobReference, JobState, JobStatistics, StorageUri,
};
pub use result::Result;
pub use table::{Table, TableField, TableReference, TableSchema};
