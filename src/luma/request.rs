//! Generation request construction and prompt validation.

use serde::Serialize;

use super::error::SubmissionError;

/// Default model for video generation.
pub const DEFAULT_MODEL: &str = "ray-3-reasoning";

/// Validate a prompt before sending it to the API.
///
/// Rejects empty and whitespace-only prompts.
pub fn validate_prompt(prompt: &str) -> Result<(), SubmissionError> {
    if prompt.trim().is_empty() {
        return Err(SubmissionError::EmptyPrompt);
    }
    Ok(())
}

/// Optional generation parameters chosen per invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelParams {
    /// e.g. "720p"
    pub resolution: Option<String>,
    /// e.g. "5s"
    pub duration: Option<String>,
}

impl ModelParams {
    pub fn new(resolution: Option<String>, duration: Option<String>) -> Self {
        Self {
            resolution: non_blank(resolution),
            duration: non_blank(duration),
        }
    }

    /// Fill unset fields from `defaults`.
    pub fn or(self, defaults: &ModelParams) -> Self {
        Self {
            resolution: self.resolution.or_else(|| defaults.resolution.clone()),
            duration: self.duration.or_else(|| defaults.duration.clone()),
        }
    }
}

/// Body of the submit call. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    prompt: String,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
}

impl GenerationRequest {
    /// Build a request, rejecting blank prompts.
    ///
    /// The prompt is trimmed; the model name is taken as given.
    pub fn new(prompt: &str, model: &str, params: ModelParams) -> Result<Self, SubmissionError> {
        validate_prompt(prompt)?;
        Ok(Self {
            prompt: prompt.trim().to_string(),
            model: model.to_string(),
            resolution: params.resolution,
            duration: params.duration,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
