//! combatlog - configuration tool for the combat logger

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use combatlog::config::Settings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "combatlog", version, about = "Combat logger configuration tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a config file and print the resolved settings
    Check {
        /// YAML config file
        path: PathBuf,
    },
    /// Print the default settings
    Defaults,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "combatlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = match cli.command {
        Command::Check { path } => {
            let settings = Settings::try_load(&path)
                .with_context(|| format!("invalid config {}", path.display()))?;
            info!("{} is valid", path.display());
            settings
        }
        Command::Defaults => Settings::default(),
    };

    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
