//! Operator CLI handler for `smartplan generate`.

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use sqlx::PgPool;

use smartplan_core::schedule::Planner;
use smartplan_core::store::postgres::{PgNotificationSink, PgPlanStore, PgTaskStore};

use crate::user_cmds::require_user;

/// Build the consecutive date range starting at `start`.
fn date_range(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days as i64).map(|i| start + Duration::days(i)).collect()
}

pub async fn run_generate(
    pool: &PgPool,
    username: &str,
    start_date: Option<&str>,
    days: u32,
) -> Result<()> {
    anyhow::ensure!(days >= 1, "days must be at least 1");

    let user = require_user(pool, username).await?;

    let start = match start_date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid start date (expected YYYY-MM-DD): {raw}"))?,
        None => Local::now().date_naive(),
    };
    let dates = date_range(start, days);

    let planner = Planner::new(
        PgTaskStore::new(pool.clone()),
        PgPlanStore::new(pool.clone()),
        PgNotificationSink::new(pool.clone()),
    );

    let results = planner.generate(user.id, &dates).await?;

    let total: usize = results.iter().map(|r| r.tasks_planned).sum();
    println!(
        "Generated plan for {} day(s) with {total} tasks scheduled.",
        results.len()
    );

    for day in &results {
        println!();
        println!(
            "{} -- {} task(s), {} min free",
            day.date, day.tasks_planned, day.remaining_minutes
        );
        if let Some(msg) = &day.message {
            println!("  {msg}");
            continue;
        }
        for entry in &day.entries {
            println!(
                "  {}  #{} {} ({} min)",
                entry.scheduled_time.format("%H:%M"),
                entry.order,
                entry.title,
                entry.duration,
            );
        }
    }

    Ok(())
}
