// ABOUTME: Operator CLI for managing recipe API users and issuing bearer tokens
// ABOUTME: Talks to the configured database directly; no server needs to be running
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Create a user
//! recipe-admin create-user --email cook@example.com --name "Home Cook"
//!
//! # Issue a bearer token for an existing user
//! recipe-admin issue-token --email cook@example.com
//!
//! # Delete a user together with all of their recipes, tags and ingredients
//! recipe-admin delete-user --email cook@example.com
//! ```

use clap::{Parser, Subcommand};
use recipe_api_server::{
    auth::AuthManager,
    config::environment::{DatabaseUrl, ServerConfig},
    constants::entities::USER,
    database::Database,
    errors::{AppError, AppResult},
    logging,
    models::User,
};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "recipe-admin",
    about = "Recipe API management CLI",
    long_about = "Create and delete users and issue bearer tokens for the recipe API."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Create a new user
    CreateUser {
        /// Email address, unique case-insensitively
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a user and everything they own
    DeleteUser {
        /// Email address of the user
        #[arg(long)]
        email: String,
    },

    /// Issue a bearer token for a user
    IssueToken {
        /// Email address of the user
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database.url = DatabaseUrl::parse_url(&url)?;
    }

    info!("Connecting to database: {}", config.database.url.to_connection_string());
    let database = Database::new(&config.database.url).await?;

    match cli.command {
        Command::CreateUser { email, name } => create_user(&database, email, name).await?,
        Command::DeleteUser { email } => delete_user(&database, &email).await?,
        Command::IssueToken { email } => issue_token(&database, &config, &email).await?,
    }
    Ok(())
}

async fn create_user(database: &Database, email: String, name: Option<String>) -> AppResult<()> {
    let user = User::new(email, name);
    database.users().create(&user).await?;

    info!(user.id = %user.id, "Created user {}", user.email);
    println!("Created user {} ({})", user.email, user.id);
    Ok(())
}

async fn delete_user(database: &Database, email: &str) -> AppResult<()> {
    let user = find_user(database, email).await?;
    database.users().delete(user.id).await?;

    info!(user.id = %user.id, "Deleted user {}", user.email);
    println!("Deleted user {} and all of their data", user.email);
    Ok(())
}

async fn issue_token(database: &Database, config: &ServerConfig, email: &str) -> AppResult<()> {
    if config.auth.ephemeral_secret {
        return Err(AppError::config(
            "JWT_SECRET must be set; a generated secret would not match the server's",
        ));
    }

    let user = find_user(database, email).await?;
    let auth_manager = AuthManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.jwt_expiry_hours,
    );
    let token = auth_manager.generate_token(&user)?;

    info!(user.id = %user.id, "Issued token valid for {} hours", auth_manager.token_expiry_hours());
    println!("{token}");
    Ok(())
}

async fn find_user(database: &Database, email: &str) -> AppResult<User> {
    database
        .users()
        .get_by_email(email)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{USER} {email}")))
}
