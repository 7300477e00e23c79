//! PostgreSQL-backed store implementations over a shared [`PgPool`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use smartplan_db::models::{NotificationKind, PlanEntry, Task};
use smartplan_db::queries::{notifications, plan_entries, tasks};

use super::{NotificationSink, PlanSlot, PlanStore, TaskStore};

/// Task reads backed by the `tasks` table.
#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list_pending(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<Task>> {
        tasks::list_pending_unplanned(&self.pool, owner, date).await
    }
}

/// Plan writes backed by the `plan_entries` table.
#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn clear(&self, owner: Uuid, date: NaiveDate) -> Result<()> {
        plan_entries::clear_day(&self.pool, owner, date).await?;
        Ok(())
    }

    async fn insert(&self, owner: Uuid, date: NaiveDate, slot: &PlanSlot) -> Result<()> {
        plan_entries::insert_entry(
            &self.pool,
            owner,
            slot.task_id,
            date,
            slot.task_order,
            slot.scheduled_time,
        )
        .await?;
        Ok(())
    }

    async fn list(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<PlanEntry>> {
        plan_entries::list_day(&self.pool, owner, date).await
    }

    /// Delete-then-insert inside a single transaction. Concurrent
    /// generations for the same (owner, date) serialize on the row locks;
    /// the last to commit fully determines the final plan. A failure at any
    /// point rolls the whole date back.
    async fn replace_day(&self, owner: Uuid, date: NaiveDate, slots: &[PlanSlot]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        sqlx::query("DELETE FROM plan_entries WHERE user_id = $1 AND plan_date = $2")
            .bind(owner)
            .bind(date)
            .execute(&mut *tx)
            .await
            .context("failed to clear plan entries")?;

        for slot in slots {
            sqlx::query(
                "INSERT INTO plan_entries (user_id, task_id, plan_date, task_order, scheduled_time) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(owner)
            .bind(slot.task_id)
            .bind(date)
            .bind(slot.task_order)
            .bind(slot.scheduled_time)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert plan entry for task {}", slot.task_id))?;
        }

        // Transaction rolls back on drop if commit is never reached.
        tx.commit().await.context("failed to commit transaction")?;

        Ok(())
    }
}

/// Notification writes backed by the `notifications` table.
#[derive(Clone)]
pub struct PgNotificationSink {
    pool: PgPool,
}

impl PgNotificationSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PgNotificationSink {
    async fn notify(&self, owner: Uuid, message: &str, kind: NotificationKind) -> Result<()> {
        notifications::insert_notification(&self.pool, owner, message, kind).await?;
        Ok(())
    }
}
