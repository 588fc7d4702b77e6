//! Remote job service traits
//!
//! These traits are the seam between the coordinator and the remote
//! warehouse. [`super::WarehouseClient`] implements them over HTTP; tests
//! implement them with in-memory fakes.

use crate::domain::{
    JobDescription, JobHandle, JobId, ProjectId, RemoteError, Table, TableReference,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote service that accepts and tracks asynchronous jobs
///
/// Implementations report failures as raw [`RemoteError`]s; classification
/// is the caller's job (see [`crate::core::classify`]). The service treats
/// `(project, job_id)` as a deduplication key: creating a job whose ID is
/// already taken must fail with an HTTP 409 style error.
///
/// # Example
///
/// ```no_run
/// use jobrelay::adapters::warehouse::{RemoteJobService, WarehouseClient};
/// use jobrelay::config::ServiceConfig;
/// use jobrelay::domain::{JobId, ProjectId};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WarehouseClient::new(&ServiceConfig::default())?;
/// let project = ProjectId::new("proj1")?;
/// let job_id = JobId::new("direct-export-1234")?;
/// let handle = client.get_job(&project, &job_id, None).await?;
/// println!("{} is {}", handle.reference, handle.state);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RemoteJobService: Send + Sync {
    /// Create a job; the description already carries its identity
    async fn create_job(
        &self,
        project: &ProjectId,
        job: &JobDescription,
    ) -> Result<JobHandle, RemoteError>;

    /// Fetch the current record of a job by identity
    async fn get_job(
        &self,
        project: &ProjectId,
        job_id: &JobId,
        location: Option<&str>,
    ) -> Result<JobHandle, RemoteError>;
}

/// Remote service that describes tables
#[async_trait]
pub trait TableService: Send + Sync {
    /// Fetch the table resource (structure, not data)
    async fn get_table(&self, table: &TableReference) -> Result<Table, RemoteError>;
}

#[async_trait]
impl<S: RemoteJobService + ?Sized> RemoteJobService for Arc<S> {
    async fn create_job(
        &self,
        project: &ProjectId,
        job: &JobDescription,
    ) -> Result<JobHandle, RemoteError> {
        (**self).create_job(project, job).await
    }

    async fn get_job(
        &self,
        project: &ProjectId,
        job_id: &JobId,
        location: Option<&str>,
    ) -> Result<JobHandle, RemoteError> {
        (**self).get_job(project, job_id, location).await
    }
}

#[async_trait]
impl<S: TableService + ?Sized> TableService for Arc<S> {
    async fn get_table(&self, table: &TableReference) -> Result<Table, RemoteError> {
        (**self).get_table(table).await
    }
}
