//! Duplicate-safe job submission
//!
//! The remote service deduplicates on job identity, so a create that races
//! with itself (a retried POST, two workers, a restarted process) fails with
//! "already exists". [`DuplicateSafeSubmitter`] treats that as success and
//! fetches the existing job instead, after checking it really is the job that
//! was asked for.

use crate::adapters::warehouse::RemoteJobService;
use crate::core::classify::{classify, classify_at};
use crate::domain::{
    ErrorClass, JobDescription, JobHandle, JobReference, JobRelayError, ProjectId,
    RemoteServiceError, Result, Stage,
};
use std::sync::Arc;

/// Result of a create attempt, after classification
#[derive(Debug)]
enum Insertion {
    Created(JobHandle),
    AlreadyExists,
    Rejected(RemoteServiceError),
}

/// Which path a successful submission took
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The create call accepted the job
    Created(JobHandle),
    /// The job already existed and was fetched by identity
    Duplicate(JobHandle),
}

impl SubmitOutcome {
    /// The job handle, whichever path produced it
    pub fn handle(&self) -> &JobHandle {
        match self {
            SubmitOutcome::Created(handle) | SubmitOutcome::Duplicate(handle) => handle,
        }
    }

    /// Consume the outcome and return the handle
    pub fn into_handle(self) -> JobHandle {
        match self {
            SubmitOutcome::Created(handle) | SubmitOutcome::Duplicate(handle) => handle,
        }
    }

    /// True if the job was already present on the service
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SubmitOutcome::Duplicate(_))
    }
}

/// Fail with `Integrity` unless both references name the same job
///
/// Project and job ID must both match; location is ignored.
///
/// # Example
///
/// ```
/// use jobrelay::core::submit::check_job_identity;
/// use jobrelay::domain::{JobId, JobReference, ProjectId};
///
/// let reference = |project: &str, job: &str| {
///     JobReference::new(ProjectId::new(project).unwrap(), JobId::new(job).unwrap())
/// };
/// let expected = reference("proj1", "job-1");
/// assert!(check_job_identity(&expected, &reference("proj1", "job-1").with_location("EU")).is_ok());
/// assert!(check_job_identity(&expected, &reference("proj1", "job-2")).is_err());
/// assert!(check_job_identity(&expected, &reference("proj2", "job-1")).is_err());
/// ```
pub fn check_job_identity(expected: &JobReference, actual: &JobReference) -> Result<()> {
    if !expected.same_job(actual) {
        return Err(JobRelayError::Integrity {
            expected: Box::new(expected.clone()),
            actual: Box::new(actual.clone()),
        });
    }
    Ok(())
}

/// Submits jobs so that resubmitting the same identity is harmless
///
/// Holds no state between calls; concurrent use from many tasks is fine.
pub struct DuplicateSafeSubmitter<S: RemoteJobService + ?Sized> {
    service: Arc<S>,
}

impl<S: RemoteJobService + ?Sized> Clone for DuplicateSafeSubmitter<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: RemoteJobService + ?Sized> DuplicateSafeSubmitter<S> {
    /// Create a submitter over a shared service client
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Submit `job`, returning the handle of the created or pre-existing job
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the job has no identity
    /// - `Integrity` if the service returns a different job
    /// - `Remote` (stage `Submission`) for any other classified failure
    pub async fn submit(&self, project: &ProjectId, job: &JobDescription) -> Result<JobHandle> {
        self.submit_classified(project, job)
            .await
            .map(SubmitOutcome::into_handle)
    }

    /// Like [`submit`](Self::submit), but reports which path was taken
    pub async fn submit_classified(
        &self,
        project: &ProjectId,
        job: &JobDescription,
    ) -> Result<SubmitOutcome> {
        let expected = job.reference();
        if expected.job_id.is_empty() {
            return Err(JobRelayError::InvalidArgument(
                "job must carry a job id before submission".to_string(),
            ));
        }

        match self.insert(project, job).await {
            Insertion::Created(handle) => {
                check_job_identity(expected, &handle.reference)?;
                tracing::debug!(
                    project_id = %project,
                    job_id = %expected.job_id,
                    state = %handle.state,
                    "Job created"
                );
                Ok(SubmitOutcome::Created(handle))
            }
            Insertion::AlreadyExists => {
                tracing::debug!(
                    project_id = %project,
                    job_id = %expected.job_id,
                    "Fetching existing job after duplicate job id"
                );
                let handle = self
                    .service
                    .get_job(project, &expected.job_id, expected.location.as_deref())
                    .await
                    .map_err(|e| classify_at(Stage::Submission, e))?;
                check_job_identity(expected, &handle.reference)?;
                Ok(SubmitOutcome::Duplicate(handle))
            }
            Insertion::Rejected(err) => {
                tracing::debug!(
                    project_id = %project,
                    job_id = %expected.job_id,
                    class = %err.class,
                    error = %err.cause,
                    "Job submission rejected"
                );
                Err(err.into())
            }
        }
    }

    async fn insert(&self, project: &ProjectId, job: &JobDescription) -> Insertion {
        match self.service.create_job(project, job).await {
            Ok(handle) => Insertion::Created(handle),
            Err(cause) => match classify(&cause) {
                ErrorClass::AlreadyExists => Insertion::AlreadyExists,
                class => Insertion::Rejected(RemoteServiceError::new(
                    class,
                    Stage::Submission,
                    cause,
                )),
            },
        }
    }
}
