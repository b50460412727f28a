//! Discord adapter: slash command registration and interaction dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    Command, CommandDataOptionValue, CommandInteraction, CommandOptionType, Context,
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EventHandler,
    GatewayIntents, GuildId, Http, Interaction, Ready,
};
use serenity::Client;

use super::handler::{CommandHandler, Invocation, ReplyError, Responder};
use crate::luma::{ModelParams, VideoApi};

const PROMPT_OPTION: &str = "prompt";
const RESOLUTION_OPTION: &str = "resolution";
const DURATION_OPTION: &str = "duration";

const RESOLUTIONS: &[&str] = &["540p", "720p", "1080p", "4k"];
const DURATIONS: &[&str] = &["5s", "9s"];

/// Build the slash command definition.
pub fn build_command(name: &str) -> CreateCommand {
    let mut resolution = CreateCommandOption::new(
        CommandOptionType::String,
        RESOLUTION_OPTION,
        "Output resolution",
    );
    for value in RESOLUTIONS {
        resolution = resolution.add_string_choice(*value, *value);
    }

    let mut duration =
        CreateCommandOption::new(CommandOptionType::String, DURATION_OPTION, "Clip length");
    for value in DURATIONS {
        duration = duration.add_string_choice(*value, *value);
    }

    CreateCommand::new(name)
        .description("Generate video with Luma AI")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                PROMPT_OPTION,
                "Describe the video to generate",
            )
            .required(true),
        )
        .add_option(resolution)
        .add_option(duration)
}

/// Turn `(name, string value)` option pairs into an invocation.
///
/// Unknown options are ignored; a missing prompt becomes an empty prompt,
/// which the workflow rejects with a user-visible error.
pub fn parse_invocation<'a, I>(options: I, user: impl Into<String>) -> Invocation
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut prompt = String::new();
    let mut resolution = None;
    let mut duration = None;

    for (name, value) in options {
        let Some(value) = value else { continue };
        match name {
            PROMPT_OPTION => prompt = value.to_string(),
            RESOLUTION_OPTION => resolution = Some(value.to_string()),
            DURATION_OPTION => duration = Some(value.to_string()),
            other => log::debug!("Ignoring unknown option '{}'", other),
        }
    }

    Invocation::new(prompt, ModelParams::new(resolution, duration), user)
}

fn invocation_from_command(command: &CommandInteraction) -> Invocation {
    let options = command.data.options.iter().map(|option| {
        let value = match &option.value {
            CommandDataOptionValue::String(s) => Some(s.as_str()),
            _ => None,
        };
        (option.name.as_str(), value)
    });
    let user = format!("{} ({})", command.user.name, command.user.id);
    parse_invocation(options, user)
}

/// Replies to one slash command interaction.
pub struct InteractionResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

impl InteractionResponder {
    pub fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn acknowledge(&self, content: &str) -> Result<(), ReplyError> {
        let message = CreateInteractionResponseMessage::new().content(content);
        self.interaction
            .create_response(&*self.http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }

    async fn follow_up(&self, content: &str) -> Result<(), ReplyError> {
        let message = CreateInteractionResponseFollowup::new().content(content);
        self.interaction.create_followup(&*self.http, message).await?;
        Ok(())
    }
}

/// Discord event handler.
pub struct Bot<A: ?Sized> {
    handler: CommandHandler<A>,
    command_name: String,
    guild_id: Option<GuildId>,
}

impl<A> Bot<A>
where
    A: VideoApi + ?Sized + 'static,
{
    pub fn new(
        handler: CommandHandler<A>,
        command_name: impl Into<String>,
        guild_id: Option<u64>,
    ) -> Self {
        Self {
            handler,
            command_name: command_name.into(),
            guild_id: guild_id.map(GuildId::new),
        }
    }

    /// Connect to the gateway and process events until the connection ends.
    pub async fn run(self, token: &str) -> Result<(), serenity::Error> {
        // Slash commands arrive without any privileged intents.
        let mut client = Client::builder(token, GatewayIntents::empty())
            .event_handler(self)
            .await?;
        client.start().await
    }
}

#[async_trait]
impl<A> EventHandler for Bot<A>
where
    A: VideoApi + ?Sized + 'static,
{
    /// Register the slash command once connected.
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("Discord bot connected as {}", ready.user.name);

        let commands = vec![build_command(&self.command_name)];
        let result = match self.guild_id {
            Some(guild_id) => guild_id.set_commands(&ctx.http, commands).await,
            None => Command::set_global_commands(&ctx.http, commands).await,
        };

        match result {
            Ok(registered) => log::info!(
                "Registered {} slash command(s) {}",
                registered.len(),
                self.guild_id
                    .map(|g| format!("on guild {}", g))
                    .unwrap_or_else(|| "globally".to_string())
            ),
            Err(e) => log::error!("Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != self.command_name {
            log::debug!("Ignoring unknown command /{}", command.data.name);
            return;
        }

        let invocation = invocation_from_command(&command);
        let responder = InteractionResponder::new(Arc::clone(&ctx.http), command);
        // The workflow runs on its own task; nothing to await here.
        let _ = self.handler.handle(invocation, responder).await;
    }
}
