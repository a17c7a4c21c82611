//! Pharmanet CLI - Database migrations and deploy checks.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the session store schema
//! pn-cli migrate
//!
//! # Validate environment configuration without starting the portal
//! pn-cli check-config
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run portal database migrations
//! - `check-config` - Load and validate portal configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pn-cli")]
#[command(author, version, about = "Pharmanet portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run portal database migrations (session store schema)
    Migrate,
    /// Load and validate configuration from the environment
    CheckConfig,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::portal().await?,
        Commands::CheckConfig => commands::config::check()?,
    }
    Ok(())
}
