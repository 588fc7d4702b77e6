//! Job reference generation
//!
//! Issues globally unique, service-legal job identities of the form
//! `{prefix}-{uuid}`. The UUID is a random v4 (122 bits of entropy in its
//! hyphenated text form), which keeps the result inside `[A-Za-z0-9_-]`.

use crate::config::{JobsConfig, JOB_ID_MAX_LENGTH, JOB_ID_PATTERN};
use crate::domain::{JobId, JobReference, JobRelayError, ProjectId, Result};
use regex::Regex;
use uuid::Uuid;

/// Character and length rules for job IDs
#[derive(Debug, Clone)]
pub struct JobIdRules {
    source: String,
    pattern: Regex,
    max_length: usize,
}

impl JobIdRules {
    /// Build rules from a pattern and a maximum length
    ///
    /// # Errors
    ///
    /// `Configuration` if the pattern is not a valid regex.
    pub fn new(pattern: &str, max_length: usize) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            JobRelayError::Configuration(format!("Invalid job id pattern '{pattern}': {e}"))
        })?;
        Ok(Self {
            source: pattern.to_string(),
            pattern: anchored,
            max_length,
        })
    }

    /// Build rules from the `[jobs]` configuration section
    pub fn from_config(config: &JobsConfig) -> Result<Self> {
        Self::new(&config.id_pattern, config.id_max_length)
    }

    /// Maximum job ID length in characters
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Pattern as configured
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// True if the whole of `value` matches the pattern
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

impl Default for JobIdRules {
    fn default() -> Self {
        Self::new(JOB_ID_PATTERN, JOB_ID_MAX_LENGTH).expect("JOB_ID_PATTERN is a valid regex")
    }
}

/// Issues unique job references from a human-readable prefix
///
/// # Example
///
/// ```
/// use jobrelay::core::reference::JobReferenceGenerator;
///
/// let generator = JobReferenceGenerator::default();
/// let reference = generator.generate("proj1", "export-job").unwrap();
/// assert!(reference.job_id.as_str().starts_with("export-job-"));
/// assert!(generator.generate("proj1", "bad id!").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobReferenceGenerator {
    rules: JobIdRules,
}

impl JobReferenceGenerator {
    /// Create a generator enforcing `rules`
    pub fn new(rules: JobIdRules) -> Self {
        Self { rules }
    }

    /// Rules this generator enforces
    pub fn rules(&self) -> &JobIdRules {
        &self.rules
    }

    /// Generate a new job reference in `project`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the project or prefix is empty, the prefix does
    /// not match the ID pattern, or the generated ID would be too long. These
    /// are programming errors and are never worth retrying.
    pub fn generate(&self, project: impl AsRef<str>, prefix: &str) -> Result<JobReference> {
        let project = ProjectId::new(project.as_ref()).map_err(JobRelayError::InvalidArgument)?;

        if prefix.is_empty() {
            return Err(JobRelayError::InvalidArgument(
                "job id prefix must not be empty".to_string(),
            ));
        }

        if !self.rules.matches(prefix) {
            return Err(JobRelayError::InvalidArgument(format!(
                "job id prefix '{prefix}' must match pattern '{}'",
                self.rules.pattern()
            )));
        }

        let full_job_id = format!("{prefix}-{}", Uuid::new_v4().hyphenated());

        let length = full_job_id.chars().count();
        if length > self.rules.max_length {
            return Err(JobRelayError::InvalidArgument(format!(
                "job id '{full_job_id}' has length {length}; must be less than or equal to {}",
                self.rules.max_length
            )));
        }

        if !self.rules.matches(&full_job_id) {
            return Err(JobRelayError::InvalidArgument(format!(
                "generated job id '{full_job_id}' does not match pattern '{}'",
                self.rules.pattern()
            )));
        }

        let job_id = JobId::new(full_job_id).map_err(JobRelayError::InvalidArgument)?;
        Ok(JobReference::new(project, job_id))
    }
}
