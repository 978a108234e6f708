//! Chirag CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! chirag-cli migrate
//!
//! # Load the sample catalog and the default admin account
//! CHIRAG_ADMIN_PASSWORD=... chirag-cli seed
//!
//! # Create an admin user
//! CHIRAG_ADMIN_PASSWORD=... chirag-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Grant the admin role to an existing account
//! chirag-cli admin promote -e someone@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `CHIRAG_ADMIN_PASSWORD` - Password for `seed` and `admin create`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "chirag-cli")]
#[command(author, version, about = "Chirag storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed an empty database with categories, products and an admin user
    Seed,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user (password from `CHIRAG_ADMIN_PASSWORD`)
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,
    },
    /// Give an existing account the admin role
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before clap so `.env` can supply the admin password as well
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chirag_cli=info,chirag_storefront=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin {
            action: AdminAction::Create { email, name },
        } => {
            commands::admin::create_user(&email, &name).await?;
        }
        Commands::Admin {
            action: AdminAction::Promote { email },
        } => {
            commands::admin::promote(&email).await?;
        }
    }
    Ok(())
}
