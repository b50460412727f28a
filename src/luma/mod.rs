//! Luma video-generation integration.
//!
//! A [`LumaClient`] submits prompts and checks job status; [`await_completion`]
//! polls a job on a fixed interval until it finishes, fails or runs out of
//! attempts. Response shapes are described by an [`ApiSchema`] rather than
//! hardcoded.

mod client;
mod error;
mod poll;
mod request;
mod schema;

pub use client::{
    ClientError, JobId, JobStatus, LumaClient, VideoApi, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_TIMEOUT, LUMA_API_BASE_URL, LUMA_API_KEY_ENV,
};
pub use error::{PollError, SubmissionError, WorkflowError};
pub use poll::{
    await_completion, run_generation, GenerationJob, JobState, PollConfig,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL,
};
pub use request::{validate_prompt, GenerationRequest, ModelParams, DEFAULT_MODEL};
pub use schema::{lookup, ApiSchema, SchemaOverrides, SchemaPreset, JOB_ID_PLACEHOLDER};
