//! Brewpoints CLI - Database migrations and shop management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! bp-cli migrate
//!
//! # Provision a shop without going through the HTTP API
//! bp-cli shop create --name "Bean There" --email owner@beanthere.example --password s3cret!
//!
//! # List shops
//! bp-cli shop list
//! ```
//!
//! # Environment Variables
//!
//! - `LOYALTY_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bp-cli")]
#[command(author, version, about = "Brewpoints CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage shops
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },
}

#[derive(Subcommand)]
enum ShopAction {
    /// Create a shop and its admin login
    Create {
        /// Shop display name
        #[arg(short, long)]
        name: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password (at least 6 characters)
        #[arg(short, long)]
        password: String,
    },
    /// List all shops
    List,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Shop { action } => match action {
            ShopAction::Create {
                name,
                email,
                password,
            } => {
                commands::shop::create(&name, &email, &password).await?;
            }
            ShopAction::List => commands::shop::list().await?,
        },
    }
    Ok(())
}
