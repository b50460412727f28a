//! LumaClient - handles communication with the Luma video-generation API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::error::{PollError, SubmissionError};
use super::request::GenerationRequest;
use super::schema::ApiSchema;

/// The environment variable name for the Luma API key.
pub const LUMA_API_KEY_ENV: &str = "LUMA_API_KEY";

/// Default base URL for the Luma API.
pub const LUMA_API_BASE_URL: &str = "https://api.lumalabs.ai";

/// Default timeout for HTTP requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP status code for rate limiting.
const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// HTTP status code for bad request (often content policy).
const HTTP_STATUS_BAD_REQUEST: u16 = 400;

/// HTTP status code for forbidden (content policy violation).
const HTTP_STATUS_FORBIDDEN: u16 = 403;

/// Keywords that indicate a content policy violation in error messages.
const CONTENT_POLICY_KEYWORDS: &[&str] = &[
    "content policy",
    "policy violation",
    "inappropriate",
    "not allowed",
    "prohibited",
    "blocked",
    "unsafe",
    "violates",
    "moderation",
    "nsfw",
];

/// Opaque job identifier issued by the API.
pub type JobId = String;

/// Classified result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Not finished yet (also used for missing or unknown status values).
    Pending,
    /// Generation completed successfully.
    Completed { video_url: String },
    /// Generation failed, with the reason the API gave if any.
    Failed { reason: Option<String> },
}

/// The two calls the workflow needs from a video-generation backend.
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Submit a generation request and return the job id.
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId, SubmissionError>;

    /// Check the current status of a job.
    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, PollError>;
}

/// Errors constructing a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Check if an error message indicates a content policy violation.
fn is_content_policy_error(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    CONTENT_POLICY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Parse the Retry-After header value in seconds.
fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Client for the Luma API.
///
/// Holds one `reqwest::Client`, whose connection pool is shared by every
/// invocation. Wrap in an `Arc` to hand it to concurrent workflows.
#[derive(Clone)]
pub struct LumaClient {
    api_key: String,
    base_url: String,
    schema: ApiSchema,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for LumaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LumaClient")
            .field("base_url", &self.base_url)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl LumaClient {
    /// Create a client against the public API with the default schema.
    pub fn with_api_key(api_key: String) -> Result<Self, ClientError> {
        Self::with_base_url(api_key, LUMA_API_BASE_URL.to_string())
    }

    /// Create a client with a custom base URL.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ClientError> {
        Self::with_timeouts(api_key, base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client with custom request and connect timeouts.
    pub fn with_timeouts(
        api_key: String,
        base_url: String,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        if api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url,
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            api_key,
            base_url,
            schema: ApiSchema::default(),
            http_client,
        })
    }

    /// Use a different response schema.
    pub fn schema(mut self, schema: ApiSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the response schema.
    pub fn api_schema(&self) -> &ApiSchema {
        &self.schema
    }

    fn submit_url(&self) -> String {
        format!("{}{}", self.base_url, self.schema.submit_path)
    }

    /// Status URL for a job. The id is percent-encoded as a single path
    /// segment, so `/`, `?` or `#` in it cannot change the request target.
    fn status_url(&self, job_id: &str) -> Result<reqwest::Url, PollError> {
        let invalid = |reason: String| {
            PollError::Network(format!("invalid base URL {}: {}", self.base_url, reason))
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| invalid("URL cannot carry a path".to_string()))?;
            segments.pop_if_empty();
            for segment in self.schema.status_segments(job_id) {
                segments.push(&segment);
            }
        }
        Ok(url)
    }

    async fn classify_submit_failure(response: reqwest::Response) -> SubmissionError {
        let status = response.status();

        if status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS {
            let retry_after_secs = parse_retry_after(&response);
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Rate limit exceeded".to_string());
            log::warn!(
                "Rate limited by Luma API. Retry-After: {:?} seconds",
                retry_after_secs
            );
            return SubmissionError::RateLimited {
                message,
                retry_after_secs,
            };
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if (status.as_u16() == HTTP_STATUS_BAD_REQUEST || status.as_u16() == HTTP_STATUS_FORBIDDEN)
            && is_content_policy_error(&body)
        {
            log::warn!("Prompt rejected by content policy: {}", body);
            return SubmissionError::ContentPolicy { message: body };
        }

        SubmissionError::Api {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl VideoApi for LumaClient {
    /// POST the request to the submit endpoint and return the issued job id.
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId, SubmissionError> {
        let url = self.submit_url();
        log::debug!("Submitting generation to {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_submit_failure(response).await);
        }

        let body: Value = response.json().await?;
        self.schema.extract_job_id(&body)
    }

    /// GET the status endpoint for `job_id` and classify the response.
    async fn poll_status(&self, job_id: &str) -> Result<JobStatus, PollError> {
        let url = self.status_url(job_id)?;

        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PollError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        self.schema.classify_status(&body)
    }
}
