//! In-memory remote job service shared by the integration tests
//!
//! Jobs live in a map keyed by job ID. Creating a known ID fails with a 409
//! like the real service. Every fetch advances the job one step through a
//! scripted list of states and then stays on the last one.

#![allow(dead_code)]

use async_trait::async_trait;
use jobrelay::adapters::warehouse::RemoteJobService;
use jobrelay::domain::{
    JobDescription, JobErrorDetail, JobHandle, JobId, JobReference, JobState, ProjectId,
    RemoteError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct StoredJob {
    reference: JobReference,
    current: JobState,
    upcoming: VecDeque<JobState>,
}

pub struct FakeJobService {
    jobs: Mutex<HashMap<String, StoredJob>>,
    script: Vec<JobState>,
    error_result: Option<JobErrorDetail>,
    fetch_failures: Mutex<VecDeque<RemoteError>>,
    answer_with: Option<JobId>,
    answer_project: Option<ProjectId>,
    creates: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeJobService {
    /// Jobs go PENDING on create, then RUNNING, then DONE
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            script: vec![JobState::Running, JobState::Done],
            error_result: None,
            fetch_failures: Mutex::new(VecDeque::new()),
            answer_with: None,
            answer_project: None,
            creates: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    /// States reported by successive fetches
    pub fn with_states(mut self, states: Vec<JobState>) -> Self {
        self.script = states;
        self
    }

    /// Error result attached once a job is in the ERROR state
    pub fn with_error_result(mut self, detail: JobErrorDetail) -> Self {
        self.error_result = Some(detail);
        self
    }

    /// Failures returned by the next fetches, before any state is reported
    pub fn with_fetch_failures(self, failures: Vec<RemoteError>) -> Self {
        *self.fetch_failures.lock().unwrap() = failures.into();
        self
    }

    /// Misbehave: report every job under this ID
    pub fn answering_with(mut self, job_id: &str) -> Self {
        self.answer_with = Some(JobId::new(job_id).unwrap());
        self
    }

    /// Misbehave: report every job as owned by this project
    pub fn answering_from_project(mut self, project_id: &str) -> Self {
        self.answer_project = Some(ProjectId::new(project_id).unwrap());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    fn handle_for(&self, job: &StoredJob) -> JobHandle {
        let mut reference = job.reference.clone();
        if let Some(id) = &self.answer_with {
            reference.job_id = id.clone();
        }
        if let Some(project_id) = &self.answer_project {
            reference.project_id = project_id.clone();
        }

        let mut handle = JobHandle::new(reference, job.current);
        if job.current == JobState::Error {
            if let Some(detail) = &self.error_result {
                handle = handle.with_error_result(detail.clone());
            }
        }
        handle
    }
}

#[async_trait]
impl RemoteJobService for FakeJobService {
    async fn create_job(
        &self,
        _project: &ProjectId,
        job: &JobDescription,
    ) -> Result<JobHandle, RemoteError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let reference = job.reference();
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.contains_key(reference.job_id.as_str()) {
            return Err(RemoteError::http(
                409,
                format!("Already Exists: Job {reference}"),
            )
            .with_reason("duplicate"));
        }

        let stored = StoredJob {
            reference: reference.clone(),
            current: JobState::Pending,
            upcoming: self.script.iter().copied().collect(),
        };
        let handle = self.handle_for(&stored);
        jobs.insert(reference.job_id.to_string(), stored);
        Ok(handle)
    }

    async fn get_job(
        &self,
        project: &ProjectId,
        job_id: &JobId,
        _location: Option<&str>,
    ) -> Result<JobHandle, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(failure) = self.fetch_failures.lock().unwrap().pop_front() {
            return Err(failure);
        }

        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(job_id.as_str()).ok_or_else(|| {
            RemoteError::http(404, format!("Not found: Job {project}:{job_id}"))
                .with_reason("notFound")
        })?;

        if let Some(next) = job.upcoming.pop_front() {
            job.current = next;
        }
        Ok(self.handle_for(job))
    }
}

/// A pending handle for a job the fake already knows about
pub async fn seeded_job(service: &FakeJobService, job_id: &str) -> JobHandle {
    use jobrelay::domain::{DestinationFormat, ExtractConfig, JobConfiguration, StorageUri};

    let reference = JobReference::new(project(), JobId::new(job_id).unwrap());
    let description = JobDescription::new(
        reference,
        JobConfiguration::Extract(ExtractConfig {
            source_table: "proj1:sales.orders".parse().unwrap(),
            destination_uris: vec![StorageUri::parse("gs://bucket/orders.json").unwrap()],
            destination_format: DestinationFormat::NewlineDelimitedJson,
        }),
    );
    let handle = service.create_job(&project(), &description).await.unwrap();
    service.creates.store(0, Ordering::SeqCst);
    handle
}

pub fn project() -> ProjectId {
    ProjectId::new("proj1").unwrap()
}
