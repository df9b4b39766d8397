//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Show which container and key a request path resolves to
    Route {
        /// Request path, e.g. /images/photo.jpg
        path: String,
    },

    /// Print metadata for a source image
    Stat {
        /// Request path
        path: String,
    },

    /// Download a source image
    Fetch {
        /// Request path
        path: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Work with the processed-image cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

impl Commands {
    /// Whether the command reads the configuration file.
    pub fn needs_settings(&self) -> bool {
        !matches!(
            self,
            Commands::Config {
                command: ConfigCommands::Path
            }
        )
    }
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Read a cached entry
    Get {
        /// Cache key
        key: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store a file in the cache
    Put {
        /// Cache key
        key: String,

        /// File to upload
        file: PathBuf,

        /// Content type (guessed from the file extension if omitted)
        #[arg(long)]
        content_type: Option<String>,

        /// Cache-control max age in seconds
        #[arg(long, default_value_t = 31_536_000)]
        max_age: u64,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the default configuration file path
    Path,
}
