//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Discord bot that turns text prompts into Luma AI videos
#[derive(Parser, Debug)]
#[command(name = "luma-bot")]
#[command(
    version,
    about = "Discord bot that turns text prompts into Luma AI videos",
    long_about = None
)]
#[command(after_help = "ENVIRONMENT:
    DISCORD_TOKEN    Discord bot token (required for `run`)
    LUMA_API_KEY     Luma API key (required for `run` and `generate`)

Both may also be set in a .env file in the working directory.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Connect to Discord and serve the slash command (default)
    Run,
    /// Generate one video from the terminal, without Discord
    #[command(after_help = "EXAMPLES:
    luma-bot generate \"a paper boat drifting down a rainy street\"
    luma-bot generate \"neon koi pond\" --resolution 720p --duration 5s")]
    Generate {
        /// Text prompt describing the video
        prompt: String,
        /// Output resolution (e.g. 720p)
        #[arg(long)]
        resolution: Option<String>,
        /// Clip length (e.g. 5s)
        #[arg(long)]
        duration: Option<String>,
        /// Override the number of status checks
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: Option<u32>,
        /// Override the seconds between status checks
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Create a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
