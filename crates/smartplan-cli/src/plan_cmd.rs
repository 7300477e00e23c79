//! Operator CLI handlers for `smartplan plan` subcommands.

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use sqlx::PgPool;

use smartplan_db::queries::plan_entries::{self, PlanEntryWithTask};

use crate::PlanCommands;
use crate::user_cmds::require_user;

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, pool: &PgPool) -> Result<()> {
    match command {
        PlanCommands::Show { user, date } => cmd_show(pool, &user, date.as_deref()).await,
        PlanCommands::Week { user, start_date } => {
            cmd_week(pool, &user, start_date.as_deref()).await
        }
    }
}

fn resolve_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date (expected YYYY-MM-DD): {raw}")),
        None => Ok(Local::now().date_naive()),
    }
}

fn print_entries(entries: &[PlanEntryWithTask]) {
    for entry in entries {
        println!(
            "  {}  #{} {} ({} min, due {}, {})",
            entry.scheduled_time.format("%H:%M"),
            entry.task_order,
            entry.title,
            entry.duration_minutes,
            entry.deadline,
            entry.category,
        );
    }
}

async fn cmd_show(pool: &PgPool, username: &str, date: Option<&str>) -> Result<()> {
    let user = require_user(pool, username).await?;
    let date = resolve_date(date)?;

    let entries = plan_entries::list_day_with_tasks(pool, user.id, date).await?;

    if entries.is_empty() {
        println!("No plan for {username} on {date}. Run `smartplan generate` first.");
        return Ok(());
    }

    println!("Plan for {username} on {date}:");
    print_entries(&entries);

    Ok(())
}

async fn cmd_week(pool: &PgPool, username: &str, start_date: Option<&str>) -> Result<()> {
    let user = require_user(pool, username).await?;
    let start = resolve_date(start_date)?;
    let end = start + Duration::days(6);

    let entries = plan_entries::list_range_with_tasks(pool, user.id, start, end).await?;

    if entries.is_empty() {
        println!("No plans for {username} between {start} and {end}.");
        return Ok(());
    }

    println!("Plans for {username}, {start} to {end}:");
    let mut current: Option<NaiveDate> = None;
    for entry in &entries {
        if current != Some(entry.plan_date) {
            println!();
            println!("{}", entry.plan_date);
            current = Some(entry.plan_date);
        }
        println!(
            "  {}  #{} {} ({} min)",
            entry.scheduled_time.format("%H:%M"),
            entry.task_order,
            entry.title,
            entry.duration_minutes,
        );
    }

    Ok(())
}
