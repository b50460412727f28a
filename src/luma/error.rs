//! Error types for the video-generation workflow.

/// Errors that prevent a generation job from being created.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Empty prompt")]
    EmptyPrompt,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited: {message}")]
    RateLimited {
        /// Body of the 429 response
        message: String,
        /// Retry-After header value in seconds, if provided
        retry_after_secs: Option<u64>,
    },

    #[error("Content policy violation: {message}")]
    ContentPolicy {
        /// Human-readable explanation of the policy violation
        message: String,
    },

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No generation ID returned (expected field '{field}')")]
    MissingJobId { field: String },
}

/// Errors from a single status check. These are transient: the polling loop
/// counts them against its attempt budget and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Status check failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Generation completed but no video URL at '{field}'")]
    MissingVideoUrl { field: String },
}

/// Terminal failure of a submit + poll workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Could not start generation: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Generation failed: {}", reason.as_deref().unwrap_or("unknown"))]
    GenerationFailed { reason: Option<String> },

    #[error("Timeout waiting for video after {attempts} attempts")]
    Timeout { attempts: u32 },
}

impl From<reqwest::Error> for SubmissionError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SubmissionError::Timeout
        } else if error.is_decode() {
            SubmissionError::InvalidResponse(error.to_string())
        } else {
            SubmissionError::Network(error.to_string())
        }
    }
}

impl From<reqwest::Error> for PollError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            PollError::Timeout
        } else if error.is_decode() {
            PollError::InvalidResponse(error.to_string())
        } else {
            PollError::Network(error.to_string())
        }
    }
}
