//! Database query functions for the `tasks` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Task;

/// Insert a new task row. Returns the inserted task with server-generated
/// defaults (id, status, created_at).
pub async fn insert_task(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    deadline: NaiveDate,
    duration_minutes: i32,
    priority: i32,
    category: &str,
) -> Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (user_id, title, deadline, duration_minutes, priority, category) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .bind(deadline)
    .bind(duration_minutes)
    .bind(priority)
    .bind(category)
    .fetch_one(pool)
    .await
    .context("failed to insert task")?;

    Ok(task)
}

/// Fetch a single task by ID.
pub async fn get_task(pool: &PgPool, id: Uuid) -> Result<Option<Task>> {
    let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch task")?;

    Ok(task)
}

/// List all tasks belonging to a user, ordered by deadline.
pub async fn list_tasks_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT * FROM tasks WHERE user_id = $1 ORDER BY deadline ASC, created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("failed to list tasks for user")?;

    Ok(tasks)
}

/// List all tasks across all users (admin view), ordered by deadline.
pub async fn list_all_tasks(pool: &PgPool) -> Result<Vec<Task>> {
    let tasks =
        sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY deadline ASC, created_at ASC")
            .fetch_all(pool)
            .await
            .context("failed to list all tasks")?;

    Ok(tasks)
}

/// List a user's pending tasks that have no plan entry for the given date.
///
/// This is the candidate set for plan generation: the check is per-date, so a
/// task already planned for a *different* date is still a candidate here.
pub async fn list_pending_unplanned(
    pool: &PgPool,
    user_id: Uuid,
    plan_date: NaiveDate,
) -> Result<Vec<Task>> {
    let tasks = sqlx::query_as::<_, Task>(
        "SELECT t.* \
         FROM tasks t \
         LEFT JOIN plan_entries pe \
           ON pe.task_id = t.id AND pe.plan_date = $2 \
         WHERE t.user_id = $1 \
           AND t.status = 'pending' \
           AND pe.id IS NULL \
         ORDER BY t.created_at ASC",
    )
    .bind(user_id)
    .bind(plan_date)
    .fetch_all(pool)
    .await
    .context("failed to list pending unplanned tasks")?;

    Ok(tasks)
}

/// Mark a task completed, stamping `completed_at`.
pub async fn complete_task(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query(
        "UPDATE tasks SET status = 'completed', completed_at = now() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await
    .context("failed to complete task")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("task {id} not found");
    }

    Ok(())
}

/// Mark a task pending again, clearing `completed_at`.
pub async fn uncomplete_task(pool: &PgPool, id: Uuid) -> Result<()> {
    let result =
        sqlx::query("UPDATE tasks SET status = 'pending', completed_at = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to uncomplete task")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("task {id} not found");
    }

    Ok(())
}

/// Delete a task. Plan entries referencing it are removed by cascade.
pub async fn delete_task(pool: &PgPool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete task")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("task {id} not found");
    }

    Ok(())
}
