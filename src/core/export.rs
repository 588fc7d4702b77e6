//! Export orchestration
//!
//! Ties the pieces together for one workflow: export a table to object
//! storage. An identity is issued, the extract job is submitted
//! duplicate-safely, and optionally the caller waits for it to finish.

use crate::adapters::warehouse::RemoteJobService;
use crate::config::JobRelayConfig;
use crate::core::poll::{CompletionPoller, LivenessCallback, NoopLiveness, PollOutcome};
use crate::core::reference::{JobIdRules, JobReferenceGenerator};
use crate::core::submit::DuplicateSafeSubmitter;
use crate::domain::{
    DestinationFormat, ErrorClass, ExtractConfig, JobConfiguration, JobDescription, JobHandle,
    JobRelayError, JobState, ProjectId, RemoteError, RemoteServiceError, Result, Stage,
    StorageUri, TableReference,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Runs table exports against a remote job service
///
/// # Example
///
/// ```rust,no_run
/// use jobrelay::adapters::warehouse::WarehouseClient;
/// use jobrelay::config::load_config;
/// use jobrelay::core::export::ExportOrchestrator;
/// use jobrelay::domain::{ProjectId, StorageUri};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config("jobrelay.toml")?;
/// let client = Arc::new(WarehouseClient::new(&config.service)?);
/// let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
///
/// let orchestrator = ExportOrchestrator::new(client, &config, shutdown_rx)?;
/// let handle = orchestrator
///     .export_to_storage(
///         &ProjectId::new("proj1")?,
///         &"proj1:sales.orders".parse()?,
///         &[StorageUri::parse("gs://bucket/orders-*.json")?],
///         true,
///     )
///     .await?;
/// println!("{} finished as {}", handle.reference, handle.state);
/// # Ok(())
/// # }
/// ```
pub struct ExportOrchestrator<S: RemoteJobService + ?Sized> {
    generator: JobReferenceGenerator,
    submitter: DuplicateSafeSubmitter<S>,
    poller: CompletionPoller<S>,
    export_prefix: String,
    destination_format: DestinationFormat,
    location: Option<String>,
    cancel: watch::Receiver<bool>,
}

impl<S: RemoteJobService + ?Sized> ExportOrchestrator<S> {
    /// Create an orchestrator over a shared service client
    ///
    /// # Errors
    ///
    /// `Configuration` if the configured job ID rules are unusable.
    pub fn new(
        service: Arc<S>,
        config: &JobRelayConfig,
        cancel: watch::Receiver<bool>,
    ) -> Result<Self> {
        let rules = JobIdRules::from_config(&config.jobs)?;

        Ok(Self {
            generator: JobReferenceGenerator::new(rules),
            submitter: DuplicateSafeSubmitter::new(Arc::clone(&service)),
            poller: CompletionPoller::new(service, config.polling.clone()),
            export_prefix: config.jobs.export_prefix.clone(),
            destination_format: config.jobs.destination_format,
            location: config.service.location.clone(),
            cancel,
        })
    }

    /// Export `source` to `destinations`
    ///
    /// With `await_completion` the call returns only once the job is DONE;
    /// otherwise it returns the handle of the accepted job right away.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `destinations` is empty
    /// - `Remote` with stage `Submission` if the job never started
    /// - `Remote` with class `Fatal` and stage `Execution` if the job ended in ERROR
    /// - `Cancelled` if the wait was cancelled
    pub async fn export_to_storage(
        &self,
        project: &ProjectId,
        source: &TableReference,
        destinations: &[StorageUri],
        await_completion: bool,
    ) -> Result<JobHandle> {
        self.export_to_storage_with_liveness(
            project,
            source,
            destinations,
            await_completion,
            &mut NoopLiveness,
        )
        .await
    }

    /// Like [`export_to_storage`](Self::export_to_storage), ticking `liveness` once per poll
    pub async fn export_to_storage_with_liveness<L>(
        &self,
        project: &ProjectId,
        source: &TableReference,
        destinations: &[StorageUri],
        await_completion: bool,
        liveness: &mut L,
    ) -> Result<JobHandle>
    where
        L: LivenessCallback + ?Sized,
    {
        if destinations.is_empty() {
            return Err(JobRelayError::InvalidArgument(
                "at least one destination URI is required".to_string(),
            ));
        }

        let mut reference = self.generator.generate(project, &self.export_prefix)?;
        if let Some(location) = &self.location {
            reference = reference.with_location(location.clone());
        }

        let job = JobDescription::new(
            reference,
            JobConfiguration::Extract(ExtractConfig {
                source_table: source.clone(),
                destination_uris: destinations.to_vec(),
                destination_format: self.destination_format,
            }),
        );

        let started = Instant::now();
        let handle = self.submitter.submit(project, &job).await?;
        crate::log_job_submitted!(project, handle.job_id(), job.configuration().kind());

        if !await_completion {
            return Ok(handle);
        }

        let mut cancel = self.cancel.clone();
        match self
            .poller
            .await_completion(project, &handle, liveness, &mut cancel)
            .await?
        {
            PollOutcome::Completed(finished) => {
                crate::log_job_completed!(finished.job_id(), finished.state, started.elapsed());
                if finished.state == JobState::Error {
                    return Err(execution_failure(&finished).into());
                }
                Ok(finished)
            }
            PollOutcome::Cancelled => Err(JobRelayError::Cancelled {
                job_id: handle.job_id().to_string(),
            }),
        }
    }
}

/// Turn a job that finished in ERROR into a classified failure
fn execution_failure(handle: &JobHandle) -> RemoteServiceError {
    let cause = match &handle.error_result {
        Some(detail) => RemoteError {
            status: None,
            reason: detail.reason.clone(),
            message: detail.message.clone(),
        },
        None => RemoteError {
            status: None,
            reason: None,
            message: format!("job {} finished in ERROR state", handle.reference),
        },
    };
    RemoteServiceError::new(ErrorClass::Fatal, Stage::Execution, cause)
}
