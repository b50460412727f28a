//! User-facing message text.

use crate::luma::{SubmissionError, WorkflowError};

/// Longest prompt echoed back in the acknowledgment, in characters.
const MAX_ECHOED_PROMPT_CHARS: usize = 1500;

/// Discord rejects messages longer than this, in characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

pub fn acknowledgment(prompt: &str) -> String {
    format!(
        "🎥 Generating video for: `{}` ... please wait!",
        echo_prompt(prompt)
    )
}

pub fn success(video_url: &str) -> String {
    format!("✅ Done! Here’s your video:\n{}", video_url)
}

/// Failure follow-up, cut to fit in one message.
pub fn failure(error: &WorkflowError) -> String {
    truncate_chars(&format!("❌ {}", describe_error(error)), MAX_MESSAGE_CHARS)
}

pub fn outcome(result: &Result<String, WorkflowError>) -> String {
    match result {
        Ok(url) => success(url),
        Err(e) => failure(e),
    }
}

/// One-line description of a workflow error for the user.
pub fn describe_error(error: &WorkflowError) -> String {
    match error {
        WorkflowError::Submission(e) => {
            format!("Could not start generation: {}", describe_submission(e))
        }
        WorkflowError::GenerationFailed { reason } => format!(
            "Generation failed: {}",
            reason.as_deref().unwrap_or("unknown")
        ),
        WorkflowError::Timeout { .. } => "Timeout waiting for video.".to_string(),
    }
}

fn describe_submission(error: &SubmissionError) -> String {
    match error {
        SubmissionError::EmptyPrompt => "the prompt is empty.".to_string(),
        SubmissionError::Network(detail) => format!("network error ({}).", detail),
        SubmissionError::Timeout => "the video service did not respond in time.".to_string(),
        SubmissionError::RateLimited {
            retry_after_secs: Some(secs),
            ..
        } => format!("the video service is busy, try again in {} seconds.", secs),
        SubmissionError::RateLimited { .. } => {
            "the video service is busy, try again later.".to_string()
        }
        SubmissionError::ContentPolicy { message } => {
            format!("the prompt was rejected by the content policy ({}).", message.trim())
        }
        SubmissionError::Api { status, body } if body.trim().is_empty() => {
            format!("the video service returned HTTP {}.", status)
        }
        SubmissionError::Api { status, body } => {
            format!("the video service returned HTTP {}: {}", status, body.trim())
        }
        SubmissionError::InvalidResponse(detail) => {
            format!("unexpected response from the video service ({}).", detail)
        }
        SubmissionError::MissingJobId { .. } => "no generation ID returned.".to_string(),
    }
}

// Backticks would end the inline code span early.
fn echo_prompt(prompt: &str) -> String {
    truncate_chars(&prompt.trim().replace('`', "'"), MAX_ECHOED_PROMPT_CHARS)
}

/// Cut `text` to at most `max_chars` characters, ending in `…` when cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
