//! HTTP client for the warehouse REST API
//!
//! Implements [`RemoteJobService`] and [`TableService`] over reqwest. Only
//! transient failures are retried here; everything else goes straight back
//! to the caller for classification.

use super::models::{ErrorEnvelope, JobResource, TableResource, REASON_INVALID_RESPONSE};
use super::service::{RemoteJobService, TableService};
use crate::config::{RetryConfig, SecretString, ServiceConfig};
use crate::core::classify::classify;
use crate::domain::{
    JobDescription, JobHandle, JobId, JobRelayError, ProjectId, RemoteError, Result, Table,
    TableReference,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Warehouse REST client
///
/// # Example
///
/// ```no_run
/// use jobrelay::adapters::warehouse::{TableService, WarehouseClient};
/// use jobrelay::config::ServiceConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = WarehouseClient::new(&ServiceConfig::default())?;
/// let table = client.get_table(&"proj1:sales.orders".parse()?).await?;
/// println!("{} rows", table.num_rows.unwrap_or(0));
/// # Ok(())
/// # }
/// ```
pub struct WarehouseClient {
    /// Base URL without a trailing slash
    base_url: String,

    client: Client,

    access_token: Option<SecretString>,

    retry: RetryConfig,
}

impl WarehouseClient {
    /// Create a client from the `[service]` configuration section
    ///
    /// # Errors
    ///
    /// `Configuration` if the underlying HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| JobRelayError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            access_token: config.access_token.clone(),
            retry: config.retry.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.expose_secret().as_ref()),
            None => request,
        }
    }

    /// Retry a request with exponential backoff while it fails transiently
    async fn retry_request<F, T, Fut>(&self, operation: F) -> std::result::Result<T, RemoteError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, RemoteError>>,
    {
        let max_retries = self.retry.max_retries;
        let mut attempt = 0;
        let mut delay_ms = self.retry.initial_delay_ms;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !classify(&e).is_transient() || attempt >= max_retries {
                        return Err(e);
                    }
                    attempt += 1;

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying request after transient error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = ((delay_ms as f64) * self.retry.backoff_multiplier) as u64;
                    delay_ms = delay_ms.min(self.retry.max_delay_ms);
                }
            }
        }
    }

    /// Send a request and hand back the response only if it succeeded
    async fn send(request: RequestBuilder) -> std::result::Result<Response, RemoteError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RemoteError::transport(format!("request timed out: {e}"))
            } else {
                RemoteError::transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ErrorEnvelope::to_remote_error(status.as_u16(), &body))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> std::result::Result<(u16, T), RemoteError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            RemoteError::transport(format!("failed to read response body: {e}"))
        })?;
        let value = serde_json::from_str(&body).map_err(|e| {
            RemoteError::http(status, format!("failed to parse response body: {e}"))
                .with_reason(REASON_INVALID_RESPONSE)
        })?;
        Ok((status, value))
    }

    fn jobs_url(&self, project: &ProjectId) -> String {
        format!("{}/projects/{}/jobs", self.base_url, project)
    }
}

#[async_trait]
impl RemoteJobService for WarehouseClient {
    async fn create_job(
        &self,
        project: &ProjectId,
        job: &JobDescription,
    ) -> std::result::Result<JobHandle, RemoteError> {
        let url = self.jobs_url(project);
        let body = JobResource::from(job);

        tracing::debug!(
            url = %url,
            job = %job.reference(),
            kind = job.configuration().kind(),
            "Creating remote job"
        );

        self.retry_request(|| async {
            let request = self.authorize(self.client.post(&url).json(&body));
            let response = Self::send(request).await?;
            let (status, resource) = Self::read_json::<JobResource>(response).await?;
            resource.into_handle(status)
        })
        .await
    }

    async fn get_job(
        &self,
        project: &ProjectId,
        job_id: &JobId,
        location: Option<&str>,
    ) -> std::result::Result<JobHandle, RemoteError> {
        let url = format!("{}/{}", self.jobs_url(project), job_id);

        tracing::trace!(url = %url, location = ?location, "Fetching remote job");

        self.retry_request(|| async {
            let mut request = self.client.get(&url);
            if let Some(location) = location {
                request = request.query(&[("location", location)]);
            }
            let response = Self::send(self.authorize(request)).await?;
            let (status, resource) = Self::read_json::<JobResource>(response).await?;
            resource.into_handle(status)
        })
        .await
    }
}

#[async_trait]
impl TableService for WarehouseClient {
    async fn get_table(&self, table: &TableReference) -> std::result::Result<Table, RemoteError> {
        let url = format!(
            "{}/projects/{}/datasets/{}/tables/{}",
            self.base_url, table.project_id, table.dataset_id, table.table_id
        );

        tracing::debug!(url = %url, table = %table, "Fetching table");

        self.retry_request(|| async {
            let response = Self::send(self.authorize(self.client.get(&url))).await?;
            let (status, resource) = Self::read_json::<TableResource>(response).await?;
            resource.into_table(status)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::{
        DestinationFormat, ExtractConfig, JobConfiguration, JobReference, JobState, StorageUri,
    };
    use mockito::Matcher;

    fn config_for(server: &mockito::Server) -> ServiceConfig {
        ServiceConfig {
            base_url: server.url(),
            access_token: Some(secret_string("test-token".to_string())),
            retry: RetryConfig {
                max_retries: 2,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
            },
            ..ServiceConfig::default()
        }
    }

    fn description(job_id: &str) -> JobDescription {
        JobDescription::new(
            JobReference::new(ProjectId::new("proj1").unwrap(), JobId::new(job_id).unwrap()),
            JobConfiguration::Extract(ExtractConfig {
                source_table: "proj1:sales.orders".parse().unwrap(),
                destination_uris: vec![StorageUri::parse("gs://bucket/out-*.json").unwrap()],
                destination_format: DestinationFormat::NewlineDelimitedJson,
            }),
        )
    }

    fn job_body(job_id: &str, state: &str) -> String {
        format!(
            r#"{{"jobReference": {{"projectId": "proj1", "jobId": "{job_id}", "location": "US"}},
                "status": {{"state": "{state}"}}}}"#
        )
    }

    #[tokio::test]
    async fn test_create_job_posts_description_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/projects/proj1/jobs")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::PartialJsonString(
                r#"{"jobReference": {"projectId": "proj1", "jobId": "job-1"}}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(job_body("job-1", "PENDING"))
            .create_async()
            .await;

        let client = WarehouseClient::new(&config_for(&server)).unwrap();
        let project = ProjectId::new("proj1").unwrap();
        let handle = client
            .create_job(&project, &description("job-1"))
            .await
            .unwrap();

        assert_eq!(handle.job_id().as_str(), "job-1");
        assert_eq!(handle.state, JobState::Pending);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_conflict_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/projects/proj1/jobs")
            .with_status(409)
            .with_body(
                r#"{"error": {"code": 409, "message": "Already Exists: Job proj1:job-1",
                    "errors": [{"reason": "duplicate"}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = WarehouseClient::new(&config_for(&server)).unwrap();
        let project = ProjectId::new("proj1").unwrap();
        let err = client
            .create_job(&project, &description("job-1"))
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(409));
        assert_eq!(err.reason.as_deref(), Some("duplicate"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transient_error_is_retried_until_budget_exhausted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/proj1/jobs/job-1")
            .with_status(503)
            .with_body("Service Unavailable")
            .expect(3)
            .create_async()
            .await;

        let client = WarehouseClient::new(&config_for(&server)).unwrap();
        let project = ProjectId::new("proj1").unwrap();
        let job_id = JobId::new("job-1").unwrap();
        let err = client.get_job(&project, &job_id, None).await.unwrap_err();

        assert_eq!(err.status, Some(503));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_job_passes_location() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/proj1/jobs/job-1")
            .match_query(Matcher::UrlEncoded("location".into(), "EU".into()))
            .with_status(200)
            .with_body(job_body("job-1", "DONE"))
            .create_async()
            .await;

        let client = WarehouseClient::new(&config_for(&server)).unwrap();
        let project = ProjectId::new("proj1").unwrap();
        let job_id = JobId::new("job-1").unwrap();
        let handle = client
            .get_job(&project, &job_id, Some("EU"))
            .await
            .unwrap();

        assert_eq!(handle.state, JobState::Done);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_table_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/projects/proj1/datasets/sales/tables/missing")
            .with_status(404)
            .with_body(
                r#"{"error": {"code": 404, "message": "Not found: Table proj1:sales.missing",
                    "errors": [{"reason": "notFound"}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = WarehouseClient::new(&config_for(&server)).unwrap();
        let err = client
            .get_table(&"proj1:sales.missing".parse().unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.status, Some(404));
        assert_eq!(err.reason.as_deref(), Some("notFound"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects/proj1/jobs/job-1")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = WarehouseClient::new(&config_for(&server)).unwrap();
        let project = ProjectId::new("proj1").unwrap();
        let job_id = JobId::new("job-1").unwrap();
        let err = client.get_job(&project, &job_id, None).await.unwrap_err();

        assert_eq!(err.reason.as_deref(), Some(REASON_INVALID_RESPONSE));
    }
}
