//! Emporium CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! emporium-cli migrate
//!
//! # Manage the back-office allow-list
//! emporium-cli admin add owner@example.com
//! emporium-cli admin remove owner@example.com
//! emporium-cli admin list
//!
//! # Insert demo categories, products and a blog post
//! emporium-cli seed
//! ```
//!
//! Every command reads `DATABASE_URL` from the environment or `.env`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "emporium-cli")]
#[command(author, version, about = "Emporium CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the admin allow-list
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert demo content
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Allow an email address into the back-office
    Add {
        /// Email address of a registered user
        email: String,
    },
    /// Revoke back-office access
    Remove {
        /// Email address to remove
        email: String,
    },
    /// List allow-listed emails
    List,
}

#[tokio::main]
async fn main() {
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
        Commands::Admin { action } => match action {
            AdminAction::Add { email } => commands::admin::add(&email).await?,
            AdminAction::Remove { email } => commands::admin::remove(&email).await?,
            AdminAction::List => commands::admin::list().await?,
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_admin_add() {
        let cli = Cli::try_parse_from(["emporium-cli", "admin", "add", "a@example.com"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Add { .. }
            })
        ));
    }
}
