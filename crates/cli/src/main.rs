//! Grabit CLI - database migrations and site administration.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! grabit migrate
//!
//! # Create a staff superuser
//! grabit user create-superuser -e admin@example.com -p 'a long password'
//!
//! # Grant or revoke seller status
//! grabit user seller ann@example.com
//! grabit user seller ann@example.com --revoke
//!
//! # Manage categories
//! grabit category add Electronics
//! grabit category list
//! grabit category remove Electronics
//! grabit category seed crates/cli/categories.example.yaml
//!
//! # Mark a store as verified
//! grabit store verify 12
//! grabit store verify 12 --revoke
//! ```
//!
//! # Environment Variables
//!
//! - `GRABIT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "grabit")]
#[command(author, version, about = "Grabit management tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage product categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage seller stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a staff account with every permission
    CreateSuperuser {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Grant seller status to a user
    Seller {
        /// Email address of the user
        email: String,

        /// Revoke seller status instead
        #[arg(long)]
        revoke: bool,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Add a category
    Add {
        /// Category name
        name: String,
    },
    /// List categories by name
    List,
    /// Remove a category; its products become uncategorized
    Remove {
        /// Category name
        name: String,
    },
    /// Add every category listed in a YAML file, skipping existing ones
    Seed {
        /// Path to the YAML file
        file: String,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Mark a store as verified
    Verify {
        /// Store account ID
        store_id: i32,

        /// Remove the verified badge instead
        #[arg(long)]
        revoke: bool,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::CreateSuperuser { email, password } => {
                commands::user::create_superuser(&email, &password).await?;
            }
            UserAction::Seller { email, revoke } => {
                commands::user::set_seller(&email, !revoke).await?;
            }
        },
        Commands::Category { action } => match action {
            CategoryAction::Add { name } => commands::category::add(&name).await?,
            CategoryAction::List => commands::category::list().await?,
            CategoryAction::Remove { name } => commands::category::remove(&name).await?,
            CategoryAction::Seed { file } => commands::category::seed(&file).await?,
        },
        Commands::Store { action } => match action {
            StoreAction::Verify { store_id, revoke } => {
                commands::store::verify(store_id, !revoke).await?;
            }
        },
    }
    Ok(())
}
