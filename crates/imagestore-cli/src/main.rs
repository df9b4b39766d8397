//! imagestore CLI entrypoint.

use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod handlers;
mod logging;
mod runtime;

#[cfg(test)]
mod config_tests;

use commands::{CacheCommands, Commands, ConfigCommands};
use config::Settings;
use runtime::Runtime;

#[derive(Parser)]
#[command(name = "imagestore")]
#[command(author, version, about = "Route, fetch and cache images in S3-compatible storage", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "IMAGESTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "IMAGESTORE_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_json);

    let settings = if cli.command.needs_settings() {
        Settings::load(cli.config.as_deref())?
    } else {
        Settings::default()
    };

    match cli.command {
        Commands::Route { path } => {
            let runtime = Runtime::from_settings(&settings)?;
            handlers::route(&runtime, &path)?
        }
        Commands::Stat { path } => {
            let runtime = Runtime::from_settings(&settings)?;
            handlers::stat(&runtime, &path).await?
        }
        Commands::Fetch { path, output } => {
            let runtime = Runtime::from_settings(&settings)?;
            handlers::fetch(&runtime, &path, output.as_deref()).await?
        }
        Commands::Cache { command } => {
            let runtime = Runtime::from_settings(&settings)?;
            match command {
                CacheCommands::Get { key, output } => {
                    handlers::cache_get(&runtime, &key, output.as_deref()).await?
                }
                CacheCommands::Put {
                    key,
                    file,
                    content_type,
                    max_age,
                } => handlers::cache_put(&runtime, &key, &file, content_type, max_age).await?,
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&settings)?,
            ConfigCommands::Path => handlers::config_path()?,
        },
    }

    Ok(())
}
