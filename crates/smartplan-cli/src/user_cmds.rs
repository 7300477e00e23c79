//! Operator CLI handlers for `smartplan user` subcommands.

use anyhow::{Context, Result};
use sqlx::PgPool;

use smartplan_core::auth;
use smartplan_db::models::{Role, User};
use smartplan_db::queries::users;

use crate::UserCommands;

/// Dispatch a `UserCommands` variant to the appropriate handler.
pub async fn run_user_command(command: UserCommands, pool: &PgPool) -> Result<()> {
    match command {
        UserCommands::Add {
            username,
            password,
            admin,
        } => cmd_add(pool, &username, &password, admin).await,
        UserCommands::List => cmd_list(pool).await,
    }
}

/// Look up a user by username, failing with a readable message if absent.
pub async fn require_user(pool: &PgPool, username: &str) -> Result<User> {
    users::get_user_by_username(pool, username)
        .await?
        .with_context(|| format!("no such user: {username}"))
}

async fn cmd_add(pool: &PgPool, username: &str, password: &str, admin: bool) -> Result<()> {
    let role = if admin { Role::Admin } else { Role::User };
    let hash = auth::hash_password(password);
    let user = users::insert_user(pool, username, &hash, role)
        .await
        .with_context(|| format!("failed to create user {username}"))?;

    println!("User created.");
    println!("  ID:       {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Role:     {}", user.role);

    Ok(())
}

async fn cmd_list(pool: &PgPool) -> Result<()> {
    let listed = users::list_users(pool).await?;

    if listed.is_empty() {
        println!("No users found. Create one with `smartplan user add`.");
        return Ok(());
    }

    println!("{:<38} {:<20} {:<8} CREATED", "ID", "USERNAME", "ROLE");
    for user in &listed {
        println!(
            "{:<38} {:<20} {:<8} {}",
            user.id,
            user.username,
            user.role.to_string(),
            user.created_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
