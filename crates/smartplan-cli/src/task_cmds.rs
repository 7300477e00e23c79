//! Operator CLI handlers for `smartplan task` subcommands.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use smartplan_db::models::TaskStatus;
use smartplan_db::queries::tasks;

use crate::TaskCommands;
use crate::user_cmds::require_user;

/// Dispatch a `TaskCommands` variant to the appropriate handler.
pub async fn run_task_command(command: TaskCommands, pool: &PgPool) -> Result<()> {
    match command {
        TaskCommands::Add {
            user,
            title,
            deadline,
            duration,
            priority,
            category,
        } => cmd_add(pool, &user, &title, &deadline, duration, priority, &category).await,
        TaskCommands::List { user } => cmd_list(pool, &user).await,
        TaskCommands::Complete { task_id } => cmd_complete(pool, &task_id).await,
        TaskCommands::Uncomplete { task_id } => cmd_uncomplete(pool, &task_id).await,
        TaskCommands::Delete { task_id } => cmd_delete(pool, &task_id).await,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}"))
}

fn parse_task_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid task ID: {raw}"))
}

async fn cmd_add(
    pool: &PgPool,
    username: &str,
    title: &str,
    deadline: &str,
    duration: i32,
    priority: i32,
    category: &str,
) -> Result<()> {
    anyhow::ensure!(duration > 0, "duration must be positive, got {duration}");
    let user = require_user(pool, username).await?;
    let deadline = parse_date(deadline)?;

    let task = tasks::insert_task(pool, user.id, title, deadline, duration, priority, category)
        .await?;

    println!("Task created.");
    println!("  ID:       {}", task.id);
    println!("  Title:    {}", task.title);
    println!("  Deadline: {}", task.deadline);
    println!("  Duration: {} min", task.duration_minutes);
    println!("  Priority: {}", task.priority);
    println!("  Category: {}", task.category);

    Ok(())
}

async fn cmd_list(pool: &PgPool, username: &str) -> Result<()> {
    let user = require_user(pool, username).await?;
    let listed = tasks::list_tasks_for_user(pool, user.id).await?;

    if listed.is_empty() {
        println!("No tasks for {username}.");
        return Ok(());
    }

    println!(
        "{:<38} {:<30} {:<11} {:>8} {:>4} {:<10} STATUS",
        "ID", "TITLE", "DEADLINE", "DURATION", "PRI", "CATEGORY"
    );
    for task in &listed {
        let marker = match task.status {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        };
        println!(
            "{:<38} {:<30} {:<11} {:>5} min {:>4} {:<10} {marker}",
            task.id,
            truncate(&task.title, 30),
            task.deadline,
            task.duration_minutes,
            task.priority,
            truncate(&task.category, 10),
        );
    }

    Ok(())
}

async fn cmd_complete(pool: &PgPool, task_id: &str) -> Result<()> {
    let id = parse_task_id(task_id)?;
    tasks::complete_task(pool, id).await?;
    println!("Task {task_id} completed.");
    Ok(())
}

async fn cmd_uncomplete(pool: &PgPool, task_id: &str) -> Result<()> {
    let id = parse_task_id(task_id)?;
    tasks::uncomplete_task(pool, id).await?;
    println!("Task {task_id} reopened.");
    Ok(())
}

async fn cmd_delete(pool: &PgPool, task_id: &str) -> Result<()> {
    let id = parse_task_id(task_id)?;
    tasks::delete_task(pool, id).await?;
    println!("Task {task_id} deleted.");
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso() {
        assert_eq!(
            parse_date("2026-03-10").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("10/03/2026").is_err());
        assert!(parse_date("soon").is_err());
    }

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_shortens_long_strings() {
        let out = truncate("a very long task title indeed", 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }
}
