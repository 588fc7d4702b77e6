//! Job domain models
//!
//! A [`JobDescription`] is what a caller submits; a [`JobHandle`] is the
//! remote service's authoritative record of it. The handle's state is owned by
//! the service and changes out-of-band, so a handle is only a snapshot: the
//! core re-fetches whenever it needs the current state.

use super::ids::{JobId, ProjectId};
use super::table::TableReference;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Identity of a job: owning project plus job ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReference {
    /// Owning project
    pub project_id: ProjectId,

    /// Job identifier
    pub job_id: JobId,

    /// Processing location, if the service requires one for lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl JobReference {
    /// Create a new job reference without a location
    pub fn new(project_id: ProjectId, job_id: JobId) -> Self {
        Self {
            project_id,
            job_id,
            location: None,
        }
    }

    /// Set the processing location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// True if both references name the same job; location is not part of identity
    pub fn same_job(&self, other: &JobReference) -> bool {
        self.project_id == other.project_id && self.job_id == other.job_id
    }
}

impl fmt::Display for JobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.job_id)
    }
}

/// Output format of an extract job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DestinationFormat {
    /// One JSON object per line
    #[default]
    NewlineDelimitedJson,
    /// Comma separated values
    Csv,
    /// Apache Avro
    Avro,
    /// Apache Parquet
    Parquet,
}

impl fmt::Display for DestinationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DestinationFormat::NewlineDelimitedJson => "NEWLINE_DELIMITED_JSON",
            DestinationFormat::Csv => "CSV",
            DestinationFormat::Avro => "AVRO",
            DestinationFormat::Parquet => "PARQUET",
        };
        f.write_str(name)
    }
}

impl FromStr for DestinationFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NEWLINE_DELIMITED_JSON" | "JSON" => Ok(DestinationFormat::NewlineDelimitedJson),
            "CSV" => Ok(DestinationFormat::Csv),
            "AVRO" => Ok(DestinationFormat::Avro),
            "PARQUET" => Ok(DestinationFormat::Parquet),
            _ => Err(format!(
                "Invalid destination format '{s}'. Must be one of: NEWLINE_DELIMITED_JSON, CSV, AVRO, PARQUET"
            )),
        }
    }
}

/// Object-storage destination URI, `scheme://bucket/path`
///
/// Wildcards (`*`) in the path are allowed; the service shards output over them.
///
/// ```
/// use jobrelay::domain::StorageUri;
///
/// let uri = StorageUri::parse("gs://bucket/out-*.json").unwrap();
/// assert_eq!(uri.bucket(), "bucket");
/// assert!(StorageUri::parse("not a uri").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageUri {
    raw: String,
    bucket: String,
}

impl StorageUri {
    /// Parse and validate a destination URI
    pub fn parse(uri: &str) -> Result<Self, String> {
        let parsed = Url::parse(uri).map_err(|e| format!("Invalid storage URI '{uri}': {e}"))?;

        let bucket = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| format!("Storage URI '{uri}' has no bucket"))?
            .to_string();

        Ok(Self {
            raw: uri.to_string(),
            bucket,
        })
    }

    /// The URI exactly as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Bucket component of the URI
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for StorageUri {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StorageUri {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StorageUri> for String {
    fn from(uri: StorageUri) -> Self {
        uri.raw
    }
}

/// Extract (table export) job configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Table to export
    pub source_table: TableReference,

    /// Ordered, non-empty list of destinations
    pub destination_uris: Vec<StorageUri>,

    /// Output format
    pub destination_format: DestinationFormat,
}

/// Job configuration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobConfiguration {
    /// Export a table to object storage
    Extract(ExtractConfig),
}

impl JobConfiguration {
    /// Short name of the job type, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            JobConfiguration::Extract(_) => "extract",
        }
    }
}

/// A job as submitted by the caller; immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescription {
    reference: JobReference,
    configuration: JobConfiguration,
}

impl JobDescription {
    /// Create a new job description
    pub fn new(reference: JobReference, configuration: JobConfiguration) -> Self {
        Self {
            reference,
            configuration,
        }
    }

    /// Identity the job will be submitted under
    pub fn reference(&self) -> &JobReference {
        &self.reference
    }

    /// Configuration payload
    pub fn configuration(&self) -> &JobConfiguration {
        &self.configuration
    }
}

/// Job lifecycle state as reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Accepted, waiting to run
    Pending,
    /// Executing
    Running,
    /// Finished successfully
    Done,
    /// Finished with an error
    Error,
}

impl JobState {
    /// `Done` and `Error` are terminal; the service never leaves them
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Done => "DONE",
            JobState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Error reported inside a job's status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobErrorDetail {
    /// Short reason code
    #[serde(default)]
    pub reason: Option<String>,

    /// Where the error occurred, if known
    #[serde(default)]
    pub location: Option<String>,

    /// Human readable message
    pub message: String,
}

impl fmt::Display for JobErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "[{reason}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Timing information for a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JobStatistics {
    /// When the job was created
    pub creation_time: Option<DateTime<Utc>>,

    /// When the job started running
    pub start_time: Option<DateTime<Utc>>,

    /// When the job finished
    pub end_time: Option<DateTime<Utc>>,
}

/// The remote service's record of a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Identity as returned by the service
    pub reference: JobReference,

    /// State at the time of the fetch
    pub state: JobState,

    /// Final error, set when `state` is `Error`
    #[serde(default)]
    pub error_result: Option<JobErrorDetail>,

    /// All errors encountered, including non-fatal ones
    #[serde(default)]
    pub errors: Vec<JobErrorDetail>,

    /// Timing information
    #[serde(default)]
    pub statistics: Option<JobStatistics>,
}

impl JobHandle {
    /// Create a handle with no error or statistics
    pub fn new(reference: JobReference, state: JobState) -> Self {
        Self {
            reference,
            state,
            error_result: None,
            errors: Vec::new(),
            statistics: None,
        }
    }

    /// Set the final error
    pub fn with_error_result(mut self, error: JobErrorDetail) -> Self {
        self.error_result = Some(error);
        self
    }

    /// Set timing information
    pub fn with_statistics(mut self, statistics: JobStatistics) -> Self {
        self.statistics = Some(statistics);
        self
    }

    /// Job ID of this handle
    pub fn job_id(&self) -> &JobId {
        &self.reference.job_id
    }

    /// Whether the snapshot is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(job_id: &str) -> JobReference {
        JobReference::new(
            ProjectId::new("proj1").unwrap(),
            JobId::new(job_id).unwrap(),
        )
    }

    #[test]
    fn test_same_job_ignores_location() {
        let a = reference("job-1");
        let b = reference("job-1").with_location("EU");
        let c = reference("job-2");

        assert!(a.same_job(&b));
        assert!(!a.same_job(&c));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Done.is_terminal());
        assert!(JobState::Error.is_terminal());
    }

    #[test]
    fn test_job_state_wire_names() {
        let json = serde_json::to_string(&JobState::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
        let state: JobState = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(state, JobState::Done);
    }

    #[test]
    fn test_destination_format_parse() {
        assert_eq!(
            "newline-delimited-json".parse::<DestinationFormat>().unwrap(),
            DestinationFormat::NewlineDelimitedJson
        );
        assert_eq!("csv".parse::<DestinationFormat>().unwrap(), DestinationFormat::Csv);
        assert!("xml".parse::<DestinationFormat>().is_err());
        assert_eq!(
            serde_json::to_string(&DestinationFormat::NewlineDelimitedJson).unwrap(),
            "\"NEWLINE_DELIMITED_JSON\""
        );
    }

    #[test]
    fn test_storage_uri_accepts_wildcards() {
        let uri = StorageUri::parse("store://bucket/out-*.json").unwrap();
        assert_eq!(uri.bucket(), "bucket");
        assert_eq!(uri.as_str(), "store://bucket/out-*.json");
    }

    #[test]
    fn test_storage_uri_rejects_missing_bucket() {
        assert!(StorageUri::parse("gs:///path/only").is_err());
        assert!(StorageUri::parse("relative/path").is_err());
    }

    #[test]
    fn test_storage_uri_serde_as_string() {
        let uri = StorageUri::parse("gs://bucket/a.json").unwrap();
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"gs://bucket/a.json\"");
        let back: StorageUri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, uri);
    }

    #[test]
    fn test_job_handle_builder() {
        let handle = JobHandle::new(reference("job-1"), JobState::Error).with_error_result(
            JobErrorDetail {
                reason: Some("invalid".to_string()),
                location: None,
                message: "bad uri".to_string(),
            },
        );

        assert!(handle.is_terminal());
        assert_eq!(handle.job_id().as_str(), "job-1");
        assert_eq!(
            handle.error_result.as_ref().map(|e| e.to_string()),
            Some("[invalid] bad uri".to_string())
        );
    }
}
