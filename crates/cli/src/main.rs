//! Bhavani Boutique CLI - migrations, admin roles and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations/ to DATABASE_URL
//! bb-cli migrate
//!
//! # Grant or revoke the admin role (the user must have signed in once)
//! bb-cli admin promote --email owner@bhavani.shop
//! bb-cli admin demote --email former@bhavani.shop
//!
//! # Load products from a YAML catalog, skipping slugs that already exist
//! bb-cli seed products --file catalog.yaml --publish
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bb-cli")]
#[command(author, version, about = "Bhavani Boutique CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage the admin role
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to a profile
    Promote {
        /// Email address of the profile
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin role from a profile
    Demote {
        /// Email address of the profile
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a YAML catalog
    Products {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,

        /// Publish every seeded product instead of creating drafts
        #[arg(long)]
        publish: bool,
    },
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
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => commands::admin::set_admin(&email, true).await?,
            AdminAction::Demote { email } => commands::admin::set_admin(&email, false).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, publish } => {
                let report = commands::seed::products(&file, publish).await?;
                tracing::info!(
                    created = report.created.len(),
                    skipped = report.skipped.len(),
                    "Seeding complete"
                );
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_products() {
        let cli = Cli::try_parse_from([
            "bb-cli", "seed", "products", "--file", "catalog.yaml", "--publish",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                target: SeedTarget::Products { publish: true, .. }
            })
        ));
    }

    #[test]
    fn test_promote_requires_email() {
        assert!(Cli::try_parse_from(["bb-cli", "admin", "promote"]).is_err());
    }
}
