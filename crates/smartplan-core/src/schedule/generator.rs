//! Plan generation service.
//!
//! Orchestrates multi-day generation over the store seams: per date,
//! candidates are read, ranked, packed, and the date's plan is replaced
//! wholesale. Step order per date follows the contract exactly: reset,
//! candidate selection, ranking, packing, persist, report.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use smartplan_db::models::NotificationKind;

use crate::store::{NotificationSink, PlanSlot, PlanStore, TaskStore};

use super::pack::{PlannerSettings, ScheduledTask, pack_day};
use super::rank::rank_candidates;

/// Message used when a date has no candidates at all.
pub const NO_PENDING_MESSAGE: &str = "No pending tasks to plan";

/// Errors detected before any store mutation happens.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("date range is empty")]
    EmptyRange,

    #[error("date range is not chronological: {current} does not follow {previous}")]
    NotChronological {
        previous: NaiveDate,
        current: NaiveDate,
    },
}

/// The outcome of generating one date's plan.
#[derive(Debug, Clone)]
pub struct DayResult {
    pub date: NaiveDate,
    pub tasks_planned: usize,
    pub remaining_minutes: i32,
    pub start_time: NaiveTime,
    /// Set when the date had no candidates.
    pub message: Option<String>,
    pub entries: Vec<ScheduledTask>,
}

/// The plan generator, parameterized over its collaborators so the core
/// logic can run against in-memory fakes in tests and Postgres in
/// production.
pub struct Planner<T, P, N> {
    tasks: T,
    plans: P,
    notifications: N,
    settings: PlannerSettings,
}

impl<T, P, N> Planner<T, P, N>
where
    T: TaskStore,
    P: PlanStore,
    N: NotificationSink,
{
    pub fn new(tasks: T, plans: P, notifications: N) -> Self {
        Self::with_settings(tasks, plans, notifications, PlannerSettings::default())
    }

    pub fn with_settings(tasks: T, plans: P, notifications: N, settings: PlannerSettings) -> Self {
        Self {
            tasks,
            plans,
            notifications,
            settings,
        }
    }

    /// Check that `dates` is non-empty and strictly chronological.
    pub fn validate_dates(dates: &[NaiveDate]) -> Result<(), ValidationError> {
        if dates.is_empty() {
            return Err(ValidationError::EmptyRange);
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ValidationError::NotChronological {
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        Ok(())
    }

    /// Generate plans for `owner` over `dates`, one [`DayResult`] per date.
    ///
    /// Each date is processed independently and in order; regenerating a
    /// date is idempotent because the previous plan is discarded first. A
    /// storage failure aborts the in-progress date and is returned; dates
    /// already persisted stay persisted. The summary notification is
    /// best-effort and never fails the call.
    pub async fn generate(&self, owner: Uuid, dates: &[NaiveDate]) -> Result<Vec<DayResult>> {
        Self::validate_dates(dates)?;

        let mut results = Vec::with_capacity(dates.len());

        for &date in dates {
            // Reset before candidate selection: pending tasks already on this
            // date's previous plan must be candidates again.
            self.plans
                .clear(owner, date)
                .await
                .with_context(|| format!("failed to reset plan for {date}"))?;

            let mut candidates = self
                .tasks
                .list_pending(owner, date)
                .await
                .with_context(|| format!("failed to load candidates for {date}"))?;

            let had_candidates = !candidates.is_empty();
            rank_candidates(&mut candidates, date);
            let packed = pack_day(&candidates, &self.settings);

            let slots: Vec<PlanSlot> = packed
                .entries
                .iter()
                .map(|e| PlanSlot {
                    task_id: e.task_id,
                    task_order: e.order,
                    scheduled_time: e.scheduled_time,
                })
                .collect();

            // Replace unconditionally: even an empty plan discards whatever
            // a previous run wrote for this date.
            self.plans
                .replace_day(owner, date, &slots)
                .await
                .with_context(|| format!("failed to persist plan for {date}"))?;

            debug!(
                owner = %owner,
                %date,
                candidates = candidates.len(),
                planned = packed.entries.len(),
                remaining_minutes = packed.remaining_minutes,
                "generated day plan"
            );

            results.push(DayResult {
                date,
                tasks_planned: packed.entries.len(),
                remaining_minutes: packed.remaining_minutes,
                start_time: self.settings.day_start,
                message: (!had_candidates).then(|| NO_PENDING_MESSAGE.to_owned()),
                entries: packed.entries,
            });
        }

        let total_planned: usize = results.iter().map(|r| r.tasks_planned).sum();
        info!(
            owner = %owner,
            days = dates.len(),
            total_planned,
            "plan generation complete"
        );

        let summary = format!(
            "Generated plan for {} day(s) with {total_planned} tasks scheduled!",
            dates.len()
        );
        if let Err(err) = self
            .notifications
            .notify(owner, &summary, NotificationKind::Success)
            .await
        {
            warn!(owner = %owner, error = %err, "failed to record generation notification");
        }

        Ok(results)
    }
}
