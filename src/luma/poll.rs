//! Fixed-interval polling of a submitted generation job.
//!
//! The loop makes at most `max_attempts` status checks, sleeping `interval`
//! between them. It stops early on a terminal status. Poll errors are
//! transient: they are logged and consume an attempt, nothing more. No sleep
//! follows the last attempt, so the wait is bounded by the attempt budget.

use std::time::Duration;

use super::client::{JobId, JobStatus, VideoApi};
use super::error::{PollError, WorkflowError};
use super::request::GenerationRequest;

/// Default number of status checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default delay between status checks (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Attempt budget and interval for [`await_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on time spent sleeping between attempts.
    pub fn max_wait(&self) -> Duration {
        self.interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL)
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Completed,
    Failed,
    TimedOut,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobState::Pending)
    }
}

/// A submitted job as seen by the polling loop.
///
/// Only [`GenerationJob::observe`] and [`GenerationJob::time_out`] move it out
/// of `Pending`; once terminal its state no longer changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    id: JobId,
    state: JobState,
    video_url: Option<String>,
    failure_reason: Option<String>,
    attempts: u32,
}

impl GenerationJob {
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            state: JobState::Pending,
            video_url: None,
            failure_reason: None,
            attempts: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Number of status checks made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record the outcome of one status check.
    pub fn observe(&mut self, outcome: &Result<JobStatus, PollError>) {
        if self.state.is_terminal() {
            return;
        }
        self.attempts += 1;
        match outcome {
            Ok(JobStatus::Completed { video_url }) => {
                self.state = JobState::Completed;
                self.video_url = Some(video_url.clone());
            }
            Ok(JobStatus::Failed { reason }) => {
                self.state = JobState::Failed;
                self.failure_reason = reason.clone();
            }
            Ok(JobStatus::Pending) | Err(_) => {}
        }
    }

    /// Give up on a job that is still pending.
    pub fn time_out(&mut self) {
        if self.state == JobState::Pending {
            self.state = JobState::TimedOut;
        }
    }

    /// Convert a terminal job into the workflow result.
    ///
    /// A job that is still pending is reported as timed out.
    pub fn into_result(self) -> Result<String, WorkflowError> {
        match self.state {
            JobState::Completed => match self.video_url {
                Some(url) => Ok(url),
                None => Err(WorkflowError::GenerationFailed { reason: None }),
            },
            JobState::Failed => Err(WorkflowError::GenerationFailed {
                reason: self.failure_reason,
            }),
            JobState::Pending | JobState::TimedOut => Err(WorkflowError::Timeout {
                attempts: self.attempts,
            }),
        }
    }
}

/// Poll `job_id` until it reaches a terminal state or the budget runs out.
pub async fn await_completion<A>(
    api: &A,
    job_id: &str,
    config: PollConfig,
) -> Result<String, WorkflowError>
where
    A: VideoApi + ?Sized,
{
    let mut job = GenerationJob::new(job_id.to_string());

    while job.attempts() < config.max_attempts {
        if job.attempts() > 0 {
            tokio::time::sleep(config.interval).await;
        }

        let outcome = api.poll_status(job.id()).await;
        job.observe(&outcome);

        match &outcome {
            Ok(JobStatus::Pending) => {
                log::debug!(
                    "Job {} pending (attempt {}/{})",
                    job.id(),
                    job.attempts(),
                    config.max_attempts
                );
            }
            Ok(JobStatus::Completed { video_url }) => {
                log::info!(
                    "Job {} completed after {} attempts: {}",
                    job.id(),
                    job.attempts(),
                    video_url
                );
            }
            Ok(JobStatus::Failed { reason }) => {
                log::warn!(
                    "Job {} failed: {}",
                    job.id(),
                    reason.as_deref().unwrap_or("unknown")
                );
            }
            Err(e) => {
                log::warn!(
                    "Status check for job {} failed (attempt {}/{}): {}",
                    job.id(),
                    job.attempts(),
                    config.max_attempts,
                    e
                );
            }
        }

        if job.state().is_terminal() {
            return job.into_result();
        }
    }

    log::error!(
        "Job {} timed out after {} attempts",
        job.id(),
        job.attempts()
    );
    job.time_out();
    job.into_result()
}

/// Submit `request` and wait for the resulting video URL.
pub async fn run_generation<A>(
    api: &A,
    request: &GenerationRequest,
    config: PollConfig,
) -> Result<String, WorkflowError>
where
    A: VideoApi + ?Sized,
{
    log::info!("Submitting generation for prompt: {}", request.prompt());
    let job_id = api.submit(request).await?;
    log::info!("Generation submitted, job id: {}", job_id);
    await_completion(api, &job_id, config).await
}
