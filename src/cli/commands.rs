//! Subcommand handlers for run, generate and config actions.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::args::ConfigAction;
use crate::bot::{Bot, CommandHandler, ConsoleResponder, Invocation};
use crate::config::{default_path, Config, ConfigError, Secrets};
use crate::luma::{LumaClient, ModelParams, PollConfig};

fn build_handler(
    config: &Config,
    secrets: &Secrets,
    poll: PollConfig,
) -> Result<CommandHandler<LumaClient>, String> {
    let client = config
        .build_client(&secrets.luma_api_key)
        .map_err(|e| format!("Failed to create Luma client: {}", e))?;

    Ok(CommandHandler::new(
        Arc::new(client),
        config.luma.model.clone(),
        config.default_params(),
        poll,
    ))
}

fn missing_secret_help(e: ConfigError) -> String {
    match e {
        ConfigError::MissingSecret { name } => format!(
            "{name} environment variable is not set.\n\n\
            Add it to a .env file:\n\
                echo '{name}=your-value-here' >> .env\n\n\
            Or set it as an environment variable:\n\
                export {name}=\"your-value-here\""
        ),
        other => other.to_string(),
    }
}

/// Connect to Discord and serve the slash command until the gateway closes.
pub async fn run_bot(config: &Config) -> Result<(), String> {
    let secrets = Secrets::from_env().map_err(missing_secret_help)?;
    let token = secrets.require_discord_token().map_err(missing_secret_help)?;

    let handler = build_handler(config, &secrets, config.poll_config())?;
    let poll = handler.poll_config();
    log::info!(
        "Starting bot: /{} -> {} ({} preset, model {}, {} attempts every {:?})",
        config.discord.command_name,
        config.luma.base_url,
        config.luma.preset,
        config.luma.model,
        poll.max_attempts,
        poll.interval
    );

    Bot::new(handler, config.discord.command_name.clone(), config.discord.guild_id)
        .run(token)
        .await
        .map_err(|e| format!("Discord client error: {}", e))
}

/// Run one generation from the terminal, printing the same messages the bot sends.
pub async fn run_generate(
    config: &Config,
    prompt: &str,
    params: ModelParams,
    max_attempts: Option<u32>,
    interval_secs: Option<u64>,
) -> Result<(), String> {
    let secrets = Secrets::from_env().map_err(missing_secret_help)?;

    let mut poll = config.poll_config();
    if let Some(attempts) = max_attempts {
        poll.max_attempts = attempts;
    }
    if let Some(secs) = interval_secs {
        poll.interval = Duration::from_secs(secs);
    }

    let handler = build_handler(config, &secrets, poll)?;
    let task = handler
        .handle(Invocation::new(prompt, params, "cli"), ConsoleResponder)
        .await
        .ok_or_else(|| "Failed to write to stdout".to_string())?;

    match task.await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("Generation task failed: {}", e)),
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
) -> Result<(), String> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&path)).map_err(|e| e.to_string())?;
            if path.exists() {
                println!("# Config file: {} (exists)", path.display());
            } else {
                println!("# Config file: {} (not found, showing defaults)", path.display());
            }
            println!();
            print!("{}", config.to_toml().map_err(|e| e.to_string())?);

            let schema = config.api_schema();
            println!();
            println!("# Effective API schema:");
            println!("#   submit: POST {}{}", config.luma.base_url, schema.submit_path);
            println!("#   status: GET  {}{}", config.luma.base_url, schema.status_path);
            println!("#   id field: {}", schema.id_field);
            println!(
                "#   status field: {} (completed: {}, failed: {})",
                schema.status_field,
                schema.completed_states.join("|"),
                schema.failed_states.join("|")
            );
            println!("#   video url field: {}", schema.video_url_field);
            println!("#   failure reason field: {}", schema.failure_reason_field);
            Ok(())
        }
        ConfigAction::Init { force } => {
            init_config_file(&path, force)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

/// Write a default config file to `path`.
pub fn init_config_file(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "Config file already exists: {}\nUse --force to overwrite it.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating config directory: {}", e))?;
    }

    let body = Config::default().to_toml().map_err(|e| e.to_string())?;
    let content = format!(
        "# luma-bot configuration\n\
        # Secrets (DISCORD_TOKEN, LUMA_API_KEY) are read from the environment.\n\
        # luma.preset: \"ray\" or \"dream-machine\"; [luma.schema] overrides single fields.\n\n{}",
        body
    );

    std::fs::write(path, content).map_err(|e| format!("Error writing config file: {}", e))
}
