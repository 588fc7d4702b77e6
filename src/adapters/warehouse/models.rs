//! Wire models for the warehouse REST API
//!
//! These mirror the service's JSON resources (camelCase, string-encoded
//! integers) and convert to and from the domain types. Nothing outside the
//! adapter sees them.

use crate::domain::{
    DestinationFormat, JobConfiguration, JobDescription, JobErrorDetail, JobHandle, JobId,
    JobReference, JobState, JobStatistics, ProjectId, RemoteError, Table, TableField,
    TableReference, TableSchema,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reason attached to responses that could not be understood
pub const REASON_INVALID_RESPONSE: &str = "invalidResponse";

fn invalid_response(status: u16, message: impl Into<String>) -> RemoteError {
    RemoteError::http(status, message).with_reason(REASON_INVALID_RESPONSE)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReferenceResource {
    pub project_id: String,
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReferenceResource {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl From<&TableReference> for TableReferenceResource {
    fn from(table: &TableReference) -> Self {
        Self {
            project_id: table.project_id.clone(),
            dataset_id: table.dataset_id.clone(),
            table_id: table.table_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResource {
    pub source_table: TableReferenceResource,
    pub destination_uris: Vec<String>,
    pub destination_format: DestinationFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorProtoResource {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<ErrorProtoResource> for JobErrorDetail {
    fn from(proto: ErrorProtoResource) -> Self {
        Self {
            reason: proto.reason,
            location: proto.location,
            message: proto.message.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResource {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error_result: Option<ErrorProtoResource>,
    #[serde(default)]
    pub errors: Vec<ErrorProtoResource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatisticsResource {
    #[serde(default)]
    pub creation_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Job resource as sent to and returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReferenceResource>,
    #[serde(default)]
    pub configuration: JobConfigurationResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatusResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<JobStatisticsResource>,
}

impl From<&JobDescription> for JobResource {
    fn from(job: &JobDescription) -> Self {
        let reference = job.reference();
        let extract = match job.configuration() {
            JobConfiguration::Extract(extract) => ExtractResource {
                source_table: TableReferenceResource::from(&extract.source_table),
                destination_uris: extract
                    .destination_uris
                    .iter()
                    .map(|uri| uri.as_str().to_string())
                    .collect(),
                destination_format: extract.destination_format,
            },
        };

        Self {
            job_reference: Some(JobReferenceResource {
                project_id: reference.project_id.as_str().to_string(),
                job_id: reference.job_id.as_str().to_string(),
                location: reference.location.clone(),
            }),
            configuration: JobConfigurationResource {
                extract: Some(extract),
            },
            status: None,
            statistics: None,
        }
    }
}

impl JobResource {
    /// Convert a response body into a handle; `status` is the HTTP status it came with
    pub fn into_handle(self, status: u16) -> Result<JobHandle, RemoteError> {
        let reference = self
            .job_reference
            .ok_or_else(|| invalid_response(status, "job resource has no jobReference"))?;

        let project_id =
            ProjectId::new(reference.project_id).map_err(|e| invalid_response(status, e))?;
        let job_id = JobId::new(reference.job_id).map_err(|e| invalid_response(status, e))?;
        let mut job_reference = JobReference::new(project_id, job_id);
        job_reference.location = reference.location;

        let job_status = self.status.unwrap_or_default();
        let state = match job_status.state.as_deref() {
            Some("PENDING") => JobState::Pending,
            Some("RUNNING") => JobState::Running,
            Some("DONE") if job_status.error_result.is_some() => JobState::Error,
            Some("DONE") => JobState::Done,
            other => {
                return Err(invalid_response(
                    status,
                    format!("unknown job state {other:?}"),
                ))
            }
        };

        Ok(JobHandle {
            reference: job_reference,
            state,
            error_result: job_status.error_result.map(JobErrorDetail::from),
            errors: job_status
                .errors
                .into_iter()
                .map(JobErrorDetail::from)
                .collect(),
            statistics: self.statistics.map(|stats| JobStatistics {
                creation_time: parse_epoch_millis(stats.creation_time.as_deref()),
                start_time: parse_epoch_millis(stats.start_time.as_deref()),
                end_time: parse_epoch_millis(stats.end_time.as_deref()),
            }),
        })
    }
}

/// The service encodes timestamps as milliseconds since the epoch, in a string
fn parse_epoch_millis(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldResource {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub fields: Vec<TableFieldResource>,
}

impl From<TableFieldResource> for TableField {
    fn from(field: TableFieldResource) -> Self {
        Self {
            name: field.name,
            field_type: field.field_type,
            mode: field.mode,
            fields: field.fields.into_iter().map(TableField::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchemaResource {
    #[serde(default)]
    pub fields: Vec<TableFieldResource>,
}

/// Table resource as returned by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResource {
    pub table_reference: TableReferenceResource,
    #[serde(default)]
    pub schema: Option<TableSchemaResource>,
    #[serde(default)]
    pub num_rows: Option<String>,
}

impl TableResource {
    /// Convert a response body into a domain table
    pub fn into_table(self, status: u16) -> Result<Table, RemoteError> {
        let reference = TableReference::new(
            self.table_reference.project_id,
            self.table_reference.dataset_id,
            self.table_reference.table_id,
        )
        .map_err(|e| invalid_response(status, e))?;

        Ok(Table {
            reference,
            schema: self.schema.map(|schema| TableSchema {
                fields: schema.fields.into_iter().map(TableField::from).collect(),
            }),
            num_rows: self.num_rows.and_then(|n| n.parse().ok()),
        })
    }
}

/// Error envelope: `{"error": {"code": 409, "message": "...", "errors": [...]}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorProtoResource>,
}

impl ErrorEnvelope {
    /// Build a RemoteError from an error response
    ///
    /// Falls back to the raw body when it is not a recognizable envelope.
    pub fn to_remote_error(status: u16, body: &str) -> RemoteError {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => {
                let reason = envelope
                    .error
                    .errors
                    .iter()
                    .find_map(|e| e.reason.clone());
                let message = envelope
                    .error
                    .message
                    .unwrap_or_else(|| format!("HTTP {status}"));
                let err = RemoteError::http(envelope.error.code.unwrap_or(status), message);
                match reason {
                    Some(reason) => err.with_reason(reason),
                    None => err,
                }
            }
            Err(_) => RemoteError::http(status, body.to_string()),
        }
    }
}
