//! Domain identifier types with validation
//!
//! Newtype wrappers for the scope (project) and job identifiers. The newtypes
//! only reject empty values; the service's character and length rules are
//! configuration (see [`crate::config::JobsConfig`]) and are enforced by the
//! job reference generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Owning scope of a job, i.e. the project that is billed for it
///
/// # Examples
///
/// ```
/// use jobrelay::domain::ids::ProjectId;
/// use std::str::FromStr;
///
/// let project = ProjectId::from_str("analytics-prod").unwrap();
/// assert_eq!(project.as_str(), "analytics-prod");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new ProjectId
    ///
    /// Returns `Err` if the value is empty or only whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Project ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the project ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Job identifier, unique within a project
///
/// The remote service treats `(project, job_id)` as a deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a new JobId
    ///
    /// Returns `Err` if the value is empty
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("Job ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the job ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the ID
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false for a constructed ID
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
