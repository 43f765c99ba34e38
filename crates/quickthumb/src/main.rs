//! Quickthumb CLI - Resize a directory of images into fixed-height thumbnails.
//!
//! # Usage
//!
//! ```bash
//! # Thumbnail a directory at the default 300px height
//! quickthumb run ./photos ./thumbs
//!
//! # Content-addressed names, 4 workers, keep existing outputs
//! quickthumb run ./photos ./thumbs --digest -j 4 --skip
//!
//! # View configuration
//! quickthumb config show
//! ```

use clap::{Parser, Subcommand};
use quickthumb_core::Config;
use std::path::Path;

mod cli;
mod logging;

/// Quickthumb - Resize a directory of images into fixed-height thumbnails.
#[derive(Parser, Debug)]
#[command(name = "quickthumb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate thumbnails for a source file or directory
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

impl Commands {
    /// Config file named on the command line, if any.
    fn config_file(&self) -> Option<&Path> {
        match self {
            Commands::Run(args) => args.config.as_deref(),
            Commands::Config(args) => match &args.command {
                cli::config::ConfigCommand::Show { config } => config.as_deref(),
                _ => None,
            },
        }
    }
}

/// Load the config that drives logging: `--config` if given, else the default file.
fn startup_config(path: Option<&Path>) -> Result<Config, quickthumb_core::ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match startup_config(cli.command.config_file()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `quickthumb config path`."
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Quickthumb v{}", quickthumb_core::VERSION);

    let result = match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    };

    if let Err(e) = result {
        tracing::debug!("Command failed: {:?}", e);
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}
