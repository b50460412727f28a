use clap::Parser;

use luma_bot::cli::{self, Args, Command};
use luma_bot::config::Config;
use luma_bot::luma::ModelParams;

/// Load .env file if present.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Log to stderr at `info` unless RUST_LOG says otherwise.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

async fn dispatch(args: Args) -> Result<(), String> {
    let load_config = || Config::load(args.config.as_deref()).map_err(|e| e.to_string());

    match args.command.unwrap_or(Command::Run) {
        Command::Config { action } => cli::handle_config_action(action, args.config.as_deref()),
        Command::Run => cli::run_bot(&load_config()?).await,
        Command::Generate {
            prompt,
            resolution,
            duration,
            max_attempts,
            interval,
        } => {
            cli::run_generate(
                &load_config()?,
                &prompt,
                ModelParams::new(resolution, duration),
                max_attempts,
                interval,
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_env();
    init_logging();

    let args = Args::parse();

    if let Err(e) = dispatch(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
