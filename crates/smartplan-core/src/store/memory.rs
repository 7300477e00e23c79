//! In-memory store implementations.
//!
//! The task and plan stores share one [`MemoryState`] (as the Postgres
//! implementations share one database), so candidate selection sees the
//! entries the plan store wrote. Used to exercise the generator in unit
//! tests without a database.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use smartplan_db::models::{NotificationKind, PlanEntry, Task, TaskStatus};

use super::{NotificationSink, PlanSlot, PlanStore, TaskStore};

/// Shared backing state for the in-memory task and plan stores.
#[derive(Default)]
pub struct MemoryState {
    tasks: RwLock<Vec<Task>>,
    plans: RwLock<HashMap<(Uuid, NaiveDate), Vec<PlanSlot>>>,
}

impl MemoryState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a task to the backing state.
    pub async fn add_task(&self, task: Task) {
        self.tasks.write().await.push(task);
    }

    /// Flip a task's status (used to simulate completion between runs).
    pub async fn set_status(&self, task_id: Uuid, status: TaskStatus) {
        let mut tasks = self.tasks.write().await;
        if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = status;
        }
    }
}

/// Task reads over [`MemoryState`].
#[derive(Clone)]
pub struct MemoryTaskStore {
    state: Arc<MemoryState>,
}

impl MemoryTaskStore {
    pub fn new(state: Arc<MemoryState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn list_pending(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<Task>> {
        let plans = self.state.plans.read().await;
        let planned: Vec<Uuid> = plans
            .get(&(owner, date))
            .map(|slots| slots.iter().map(|s| s.task_id).collect())
            .unwrap_or_default();

        let tasks = self.state.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|t| {
                t.user_id == owner
                    && t.status == TaskStatus::Pending
                    && !planned.contains(&t.id)
            })
            .cloned()
            .collect())
    }
}

/// Plan writes over [`MemoryState`].
#[derive(Clone)]
pub struct MemoryPlanStore {
    state: Arc<MemoryState>,
}

impl MemoryPlanStore {
    pub fn new(state: Arc<MemoryState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn clear(&self, owner: Uuid, date: NaiveDate) -> Result<()> {
        self.state.plans.write().await.remove(&(owner, date));
        Ok(())
    }

    async fn insert(&self, owner: Uuid, date: NaiveDate, slot: &PlanSlot) -> Result<()> {
        self.state
            .plans
            .write()
            .await
            .entry((owner, date))
            .or_default()
            .push(slot.clone());
        Ok(())
    }

    async fn list(&self, owner: Uuid, date: NaiveDate) -> Result<Vec<PlanEntry>> {
        let plans = self.state.plans.read().await;
        let mut slots = plans.get(&(owner, date)).cloned().unwrap_or_default();
        slots.sort_by_key(|s| s.task_order);
        Ok(slots
            .into_iter()
            .map(|s| PlanEntry {
                id: Uuid::new_v4(),
                user_id: owner,
                task_id: s.task_id,
                plan_date: date,
                task_order: s.task_order,
                scheduled_time: s.scheduled_time,
                created_at: Utc::now(),
            })
            .collect())
    }
}

#[derive(Default)]
struct SinkInner {
    messages: RwLock<Vec<(Uuid, String, NotificationKind)>>,
    fail: AtomicBool,
}

/// Notification sink that records messages, with a failure toggle for
/// testing that sink errors never fail generation. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryNotificationSink {
    inner: Arc<SinkInner>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `notify` call return an error.
    pub fn fail_next(&self) {
        self.inner.fail.store(true, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<(Uuid, String, NotificationKind)> {
        self.inner.messages.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn notify(&self, owner: Uuid, message: &str, kind: NotificationKind) -> Result<()> {
        if self.inner.fail.load(Ordering::SeqCst) {
            bail!("notification sink unavailable");
        }
        self.inner
            .messages
            .write()
            .await
            .push((owner, message.to_owned(), kind));
        Ok(())
    }
}
