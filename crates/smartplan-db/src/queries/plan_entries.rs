//! Database query functions for the `plan_entries` table.
//!
//! Plan entries are written only by the plan generator; regenerating a date
//! replaces that date's rows wholesale. The joined views here back the
//! plan-retrieval and calendar endpoints.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PlanEntry, TaskStatus};

/// Remove all plan entries for (user, date). Returns the number of rows
/// removed. Safe to call when no plan exists.
pub async fn clear_day(pool: &PgPool, user_id: Uuid, plan_date: NaiveDate) -> Result<u64> {
    let result = sqlx::query("DELETE FROM plan_entries WHERE user_id = $1 AND plan_date = $2")
        .bind(user_id)
        .bind(plan_date)
        .execute(pool)
        .await
        .context("failed to clear plan entries")?;

    Ok(result.rows_affected())
}

/// Insert a single plan entry.
pub async fn insert_entry(
    pool: &PgPool,
    user_id: Uuid,
    task_id: Uuid,
    plan_date: NaiveDate,
    task_order: i32,
    scheduled_time: NaiveTime,
) -> Result<PlanEntry> {
    let entry = sqlx::query_as::<_, PlanEntry>(
        "INSERT INTO plan_entries (user_id, task_id, plan_date, task_order, scheduled_time) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(task_id)
    .bind(plan_date)
    .bind(task_order)
    .bind(scheduled_time)
    .fetch_one(pool)
    .await
    .context("failed to insert plan entry")?;

    Ok(entry)
}

/// List the plan entries for (user, date), ordered by task_order.
pub async fn list_day(pool: &PgPool, user_id: Uuid, plan_date: NaiveDate) -> Result<Vec<PlanEntry>> {
    let entries = sqlx::query_as::<_, PlanEntry>(
        "SELECT * FROM plan_entries \
         WHERE user_id = $1 AND plan_date = $2 \
         ORDER BY task_order ASC",
    )
    .bind(user_id)
    .bind(plan_date)
    .fetch_all(pool)
    .await
    .context("failed to list plan entries")?;

    Ok(entries)
}

/// A plan entry joined with its task (for plan views and the calendar).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanEntryWithTask {
    pub task_id: Uuid,
    pub plan_date: NaiveDate,
    pub task_order: i32,
    pub scheduled_time: NaiveTime,
    pub title: String,
    pub duration_minutes: i32,
    pub priority: i32,
    pub deadline: NaiveDate,
    pub category: String,
    pub status: TaskStatus,
}

/// List a day's plan joined with task data, ordered by task_order.
pub async fn list_day_with_tasks(
    pool: &PgPool,
    user_id: Uuid,
    plan_date: NaiveDate,
) -> Result<Vec<PlanEntryWithTask>> {
    let rows = sqlx::query_as::<_, PlanEntryWithTask>(
        "SELECT pe.task_id, pe.plan_date, pe.task_order, pe.scheduled_time, \
                t.title, t.duration_minutes, t.priority, t.deadline, t.category, t.status \
         FROM plan_entries pe \
         JOIN tasks t ON t.id = pe.task_id \
         WHERE pe.user_id = $1 AND pe.plan_date = $2 \
         ORDER BY pe.task_order ASC",
    )
    .bind(user_id)
    .bind(plan_date)
    .fetch_all(pool)
    .await
    .context("failed to list day plan with tasks")?;

    Ok(rows)
}

/// List all plan entries for a date range joined with task data, ordered by
/// date then task_order. Backs the calendar view.
pub async fn list_range_with_tasks(
    pool: &PgPool,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PlanEntryWithTask>> {
    let rows = sqlx::query_as::<_, PlanEntryWithTask>(
        "SELECT pe.task_id, pe.plan_date, pe.task_order, pe.scheduled_time, \
                t.title, t.duration_minutes, t.priority, t.deadline, t.category, t.status \
         FROM plan_entries pe \
         JOIN tasks t ON t.id = pe.task_id \
         WHERE pe.user_id = $1 AND pe.plan_date BETWEEN $2 AND $3 \
         ORDER BY pe.plan_date ASC, pe.task_order ASC",
    )
    .bind(user_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await
    .context("failed to list plan range with tasks")?;

    Ok(rows)
}
