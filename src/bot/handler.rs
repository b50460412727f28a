//! Platform-independent command handling.
//!
//! Every invocation gets exactly one acknowledgment and, if that succeeds,
//! exactly one follow-up. The submit + poll workflow runs on its own tokio
//! task so the caller's event path returns as soon as the acknowledgment is
//! sent.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::messages;
use crate::luma::{
    run_generation, GenerationRequest, ModelParams, PollConfig, VideoApi, WorkflowError,
};

/// Failure delivering a message back to the user.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("Discord API error: {0}")]
    Discord(#[from] Box<serenity::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serenity::Error> for ReplyError {
    fn from(error: serenity::Error) -> Self {
        ReplyError::Discord(Box::new(error))
    }
}

/// Where the acknowledgment and the follow-up go.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn acknowledge(&self, content: &str) -> Result<(), ReplyError>;
    async fn follow_up(&self, content: &str) -> Result<(), ReplyError>;
}

#[async_trait]
impl<R> Responder for Arc<R>
where
    R: Responder + ?Sized,
{
    async fn acknowledge(&self, content: &str) -> Result<(), ReplyError> {
        (**self).acknowledge(content).await
    }

    async fn follow_up(&self, content: &str) -> Result<(), ReplyError> {
        (**self).follow_up(content).await
    }
}

/// One command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub prompt: String,
    pub params: ModelParams,
    /// Who invoked the command, for logging.
    pub user: String,
}

impl Invocation {
    pub fn new(prompt: impl Into<String>, params: ModelParams, user: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params,
            user: user.into(),
        }
    }
}

/// Runs the generation workflow for command invocations.
///
/// Holds no per-invocation state, so one handler serves any number of
/// concurrent invocations.
pub struct CommandHandler<A: ?Sized> {
    api: Arc<A>,
    model: String,
    defaults: ModelParams,
    poll: PollConfig,
}

impl<A> CommandHandler<A>
where
    A: VideoApi + ?Sized + 'static,
{
    pub fn new(
        api: Arc<A>,
        model: impl Into<String>,
        defaults: ModelParams,
        poll: PollConfig,
    ) -> Self {
        Self {
            api,
            model: model.into(),
            defaults,
            poll,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// Acknowledge the invocation and start the workflow in the background.
    ///
    /// Returns `None` when the acknowledgment could not be delivered; no job is
    /// submitted in that case. Otherwise returns the handle of the workflow
    /// task, which resolves after the follow-up has been sent.
    pub async fn handle<R>(
        &self,
        invocation: Invocation,
        responder: R,
    ) -> Option<JoinHandle<Result<String, WorkflowError>>>
    where
        R: Responder + 'static,
    {
        let ack = messages::acknowledgment(&invocation.prompt);
        if let Err(e) = responder.acknowledge(&ack).await {
            log::error!("Failed to acknowledge command from {}: {}", invocation.user, e);
            return None;
        }

        let api = Arc::clone(&self.api);
        let model = self.model.clone();
        let params = invocation.params.clone().or(&self.defaults);
        let poll = self.poll;

        Some(tokio::spawn(async move {
            log::info!("Generating video for {}: {}", invocation.user, invocation.prompt);

            let result = match GenerationRequest::new(&invocation.prompt, &model, params) {
                Ok(request) => run_generation(api.as_ref(), &request, poll).await,
                Err(e) => Err(WorkflowError::from(e)),
            };

            let reply = messages::outcome(&result);
            match &result {
                Ok(url) => log::info!("Video for {} ready: {}", invocation.user, url),
                Err(e) => log::warn!("Generation for {} failed: {}", invocation.user, e),
            }

            if let Err(e) = responder.follow_up(&reply).await {
                log::error!("Failed to send follow-up to {}: {}", invocation.user, e);
            }

            result
        }))
    }
}
