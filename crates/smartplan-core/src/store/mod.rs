//! Store seams the plan generator runs against.
//!
//! The generator itself is pure; everything it reads or writes goes through
//! these traits. Production uses the PostgreSQL-backed implementations in
//! [`postgres`]; unit tests use the in-memory fakes in [`memory`].

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use smartplan_db::models::{NotificationKind, PlanEntry, Task};

/// A slot to be persisted in a day's plan: which task, in what position,
/// starting when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSlot {
    pub task_id: Uuid,
    pub task_order: i32,
    pub scheduled_time: NaiveTime,
}

/// Read side: the generator's view of a user's tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// The candidate set for plan generation: the owner's pending tasks with
    /// no plan entry for `date`. The check is per-date -- a task planned for
    /// a different date is still a candidate here.
    async fn list_pending(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<Task>>;
}

/// Write side: a day's plan for one owner.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Remove all entries for (owner, date).
    async fn clear(&self, owner: Uuid, date: NaiveDate) -> Result<()>;

    /// Insert a single entry for (owner, date).
    async fn insert(&self, owner: Uuid, date: NaiveDate, slot: &PlanSlot) -> Result<()>;

    /// List the entries for (owner, date), ordered by task_order.
    async fn list(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<PlanEntry>>;

    /// Destructively replace the plan for (owner, date) with `slots`.
    ///
    /// The default implementation is clear-then-insert. Backends that can
    /// should override this to run the whole replacement atomically, so a
    /// failure mid-sequence leaves the previous plan intact rather than a
    /// half-written one.
    async fn replace_day(&self, owner: Uuid, date: NaiveDate, slots: &[PlanSlot]) -> Result<()> {
        self.clear(owner, date).await?;
        for slot in slots {
            self.insert(owner, date, slot).await?;
        }
        Ok(())
    }
}

/// Observer for generation summaries. Failures here must never fail the
/// generation call itself.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, owner: Uuid, message: &str, kind: NotificationKind) -> Result<()>;
}
