//! ProShop CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! proshop-cli migrate
//!
//! # Replace all data with the contents of a seed file
//! proshop-cli seed --file crates/cli/seed/proshop.yaml
//!
//! # Delete all users, products and reviews
//! proshop-cli seed --destroy
//! ```
//!
//! # Environment Variables
//!
//! - `API_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proshop-cli")]
#[command(author, version, about = "ProShop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load users and products from a YAML file
    Seed {
        /// Seed file to import
        #[arg(short, long, required_unless_present = "destroy")]
        file: Option<PathBuf>,

        /// Delete all data instead of importing
        #[arg(short, long, conflicts_with = "file")]
        destroy: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { destroy: true, .. } => commands::seed::destroy().await,
        Commands::Seed { file: Some(file), .. } => commands::seed::import(&file).await,
        Commands::Seed { file: None, .. } => Err(commands::CommandError::MissingSeedFile),
    }
}
