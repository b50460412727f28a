//! Response-shape configuration for the Luma API.
//!
//! The endpoint paths and field names of the generation API have changed over
//! time, so none of them are hardcoded in the client. An [`ApiSchema`] describes
//! where to send requests and where to find the job id, status, video URL and
//! failure reason in the JSON responses. Field locations are either plain
//! top-level keys (`"id"`) or JSON pointers (`"/output/video_url"`).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::JobStatus;
use super::error::{PollError, SubmissionError};

/// Placeholder for the job id inside [`ApiSchema::status_path`].
pub const JOB_ID_PLACEHOLDER: &str = "{id}";

/// Built-in response shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaPreset {
    /// `/v1/ray/generate` with `status` and `output.video_url`.
    #[default]
    Ray,
    /// `/dream-machine/v1/generations` with `state` and `assets.video`.
    #[serde(alias = "dream_machine")]
    DreamMachine,
}

impl fmt::Display for SchemaPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPreset::Ray => write!(f, "ray"),
            SchemaPreset::DreamMachine => write!(f, "dream-machine"),
        }
    }
}

/// Endpoint paths and response field locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSchema {
    /// Path of the submit endpoint, appended to the base URL.
    pub submit_path: String,
    /// Path of the status endpoint; `{id}` is replaced by the job id.
    pub status_path: String,
    /// Location of the job id in the submit response.
    pub id_field: String,
    /// Location of the status value in the poll response.
    pub status_field: String,
    /// Status values (case-insensitive) meaning the video is ready.
    pub completed_states: Vec<String>,
    /// Status values (case-insensitive) meaning generation failed for good.
    pub failed_states: Vec<String>,
    /// Location of the video URL in a completed poll response.
    pub video_url_field: String,
    /// Location of the failure reason in a failed poll response.
    pub failure_reason_field: String,
}

impl ApiSchema {
    pub fn preset(preset: SchemaPreset) -> Self {
        match preset {
            SchemaPreset::Ray => Self {
                submit_path: "/v1/ray/generate".to_string(),
                status_path: "/v1/ray/generations/{id}".to_string(),
                id_field: "id".to_string(),
                status_field: "status".to_string(),
                completed_states: vec!["completed".to_string()],
                failed_states: vec!["failed".to_string()],
                video_url_field: "/output/video_url".to_string(),
                failure_reason_field: "error".to_string(),
            },
            SchemaPreset::DreamMachine => Self {
                submit_path: "/dream-machine/v1/generations".to_string(),
                status_path: "/dream-machine/v1/generations/{id}".to_string(),
                id_field: "id".to_string(),
                status_field: "state".to_string(),
                completed_states: vec!["completed".to_string()],
                failed_states: vec!["failed".to_string()],
                video_url_field: "/assets/video".to_string(),
                failure_reason_field: "failure_reason".to_string(),
            },
        }
    }

    /// Path segments of the status endpoint for a job, with the id
    /// substituted. Segments are not percent-encoded yet.
    pub fn status_segments(&self, job_id: &str) -> Vec<String> {
        self.status_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.replace(JOB_ID_PLACEHOLDER, job_id))
            .collect()
    }

    /// Pull the job id out of a submit response.
    ///
    /// Only a non-empty string (or a number, which some revisions used) counts
    /// as an id; anything else is a missing id.
    pub fn extract_job_id(&self, body: &Value) -> Result<String, SubmissionError> {
        let id = match lookup(body, &self.id_field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        id.ok_or_else(|| SubmissionError::MissingJobId {
            field: self.id_field.clone(),
        })
    }

    /// Classify a poll response.
    ///
    /// A missing, non-string or unrecognised status is `Pending`. A completed
    /// status without a video URL is an error so the caller keeps polling
    /// instead of reporting an empty success.
    pub fn classify_status(&self, body: &Value) -> Result<JobStatus, PollError> {
        let status = match lookup(body, &self.status_field).and_then(Value::as_str) {
            Some(s) => s.trim().to_lowercase(),
            None => return Ok(JobStatus::Pending),
        };

        if matches_any(&status, &self.completed_states) {
            return match lookup(body, &self.video_url_field).and_then(Value::as_str) {
                Some(url) if !url.trim().is_empty() => Ok(JobStatus::Completed {
                    video_url: url.trim().to_string(),
                }),
                _ => Err(PollError::MissingVideoUrl {
                    field: self.video_url_field.clone(),
                }),
            };
        }

        if matches_any(&status, &self.failed_states) {
            let reason = lookup(body, &self.failure_reason_field)
                .and_then(reason_text)
                .filter(|r| !r.is_empty());
            return Ok(JobStatus::Failed { reason });
        }

        Ok(JobStatus::Pending)
    }
}

impl Default for ApiSchema {
    fn default() -> Self {
        Self::preset(SchemaPreset::default())
    }
}

/// Per-field overrides layered on top of a preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason_field: Option<String>,
}

impl SchemaOverrides {
    pub fn apply(self, mut schema: ApiSchema) -> ApiSchema {
        if let Some(v) = self.submit_path {
            schema.submit_path = v;
        }
        if let Some(v) = self.status_path {
            schema.status_path = v;
        }
        if let Some(v) = self.id_field {
            schema.id_field = v;
        }
        if let Some(v) = self.status_field {
            schema.status_field = v;
        }
        if let Some(v) = self.completed_states {
            schema.completed_states = v;
        }
        if let Some(v) = self.failed_states {
            schema.failed_states = v;
        }
        if let Some(v) = self.video_url_field {
            schema.video_url_field = v;
        }
        if let Some(v) = self.failure_reason_field {
            schema.failure_reason_field = v;
        }
        schema
    }
}

/// Resolve a field location against a JSON document.
pub fn lookup<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    if field.starts_with('/') {
        body.pointer(field)
    } else {
        body.get(field)
    }
}

fn matches_any(status: &str, states: &[String]) -> bool {
    states.iter().any(|s| s.trim().eq_ignore_ascii_case(status))
}

// Failure reasons show up as plain strings or as `{"message": ...}` objects.
fn reason_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string()),
        _ => None,
    }
}
