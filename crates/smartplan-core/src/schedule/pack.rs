//! Greedy packing of ranked candidates into a day's time budget.

use chrono::{Duration, NaiveTime};
use tracing::warn;
use uuid::Uuid;

use smartplan_db::models::Task;

/// Per-day scheduling parameters.
///
/// The production values are fixed (300 minutes starting at 09:00); the
/// struct exists so tests and future hardening can vary them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Total schedulable minutes per day.
    pub capacity_minutes: i32,
    /// Wall-clock start of the first slot.
    pub day_start: NaiveTime,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            capacity_minutes: 300,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time"),
        }
    }
}

/// An accepted task with its position and start time within the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task_id: Uuid,
    pub title: String,
    pub order: i32,
    pub duration: i32,
    pub scheduled_time: NaiveTime,
}

/// The outcome of packing one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDay {
    pub entries: Vec<ScheduledTask>,
    pub remaining_minutes: i32,
}

/// Single-pass greedy bin-fill over an already-ranked candidate list.
///
/// Walks the full list once, accepting any task whose duration fits the
/// remaining budget. The scan does NOT stop at the first task that does not
/// fit: a shorter task later in rank order is still accepted if it
/// individually fits. Accepted tasks get dense order numbers starting at 1
/// and start times equal to the day start plus the cumulative accepted
/// duration. This is deliberate greedy fill, not an optimal knapsack.
pub fn pack_day(ranked: &[Task], settings: &PlannerSettings) -> PackedDay {
    let mut available_minutes = settings.capacity_minutes;
    let mut current_time = settings.day_start;
    let mut order = 1;
    let mut entries = Vec::new();

    for task in ranked {
        if task.duration_minutes > settings.capacity_minutes {
            // Can never fit on any day; leave it pending but make the
            // condition visible to operators.
            warn!(
                task_id = %task.id,
                duration_minutes = task.duration_minutes,
                capacity_minutes = settings.capacity_minutes,
                "task duration exceeds full daily capacity; it will never be scheduled"
            );
        }

        if task.duration_minutes <= available_minutes {
            entries.push(ScheduledTask {
                task_id: task.id,
                title: task.title.clone(),
                order,
                duration: task.duration_minutes,
                scheduled_time: current_time,
            });
            current_time += Duration::minutes(i64::from(task.duration_minutes));
            available_minutes -= task.duration_minutes;
            order += 1;
        }
    }

    PackedDay {
        entries,
        remaining_minutes: available_minutes,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use smartplan_db::models::TaskStatus;

    use super::*;

    fn task(title: &str, duration: i32) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_owned(),
            deadline: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            duration_minutes: duration,
            priority: 0,
            status: TaskStatus::Pending,
            category: "General".to_owned(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn packs_in_order_with_cumulative_times() {
        let ranked = vec![task("a", 60), task("b", 30), task("c", 90)];
        let packed = pack_day(&ranked, &PlannerSettings::default());

        assert_eq!(packed.entries.len(), 3);
        assert_eq!(packed.remaining_minutes, 300 - 180);

        let orders: Vec<i32> = packed.entries.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);

        let times: Vec<NaiveTime> = packed.entries.iter().map(|e| e.scheduled_time).collect();
        assert_eq!(times, vec![hm(9, 0), hm(10, 0), hm(10, 30)]);
    }

    #[test]
    fn continues_scanning_past_a_miss() {
        // 250 fits; 100 does not (250+100 > 300); 40 still fits (250+40 <= 300).
        let ranked = vec![task("big", 250), task("mid", 100), task("small", 40)];
        let packed = pack_day(&ranked, &PlannerSettings::default());

        let titles: Vec<&str> = packed.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["big", "small"]);
        assert_eq!(packed.remaining_minutes, 10);

        // Order numbers stay dense across the skip.
        assert_eq!(packed.entries[0].order, 1);
        assert_eq!(packed.entries[1].order, 2);
        // The accepted-after-a-miss task starts right after the first one.
        assert_eq!(packed.entries[1].scheduled_time, hm(13, 10));
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let ranked = vec![
            task("a", 120),
            task("b", 120),
            task("c", 120),
            task("d", 50),
        ];
        let packed = pack_day(&ranked, &PlannerSettings::default());

        let total: i32 = packed.entries.iter().map(|e| e.duration).sum();
        assert!(total <= 300, "scheduled {total} minutes, capacity is 300");
        assert_eq!(packed.remaining_minutes, 300 - total);
    }

    #[test]
    fn oversized_task_is_skipped_entirely() {
        let ranked = vec![task("marathon", 400), task("ok", 60)];
        let packed = pack_day(&ranked, &PlannerSettings::default());

        assert_eq!(packed.entries.len(), 1);
        assert_eq!(packed.entries[0].title, "ok");
        assert_eq!(packed.entries[0].order, 1);
        assert_eq!(packed.entries[0].scheduled_time, hm(9, 0));
    }

    #[test]
    fn empty_input_leaves_full_capacity() {
        let packed = pack_day(&[], &PlannerSettings::default());
        assert!(packed.entries.is_empty());
        assert_eq!(packed.remaining_minutes, 300);
    }

    #[test]
    fn custom_settings_are_honored() {
        let settings = PlannerSettings {
            capacity_minutes: 90,
            day_start: hm(14, 0),
        };
        let ranked = vec![task("a", 60), task("b", 60), task("c", 30)];
        let packed = pack_day(&ranked, &settings);

        let titles: Vec<&str> = packed.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
        assert_eq!(packed.entries[0].scheduled_time, hm(14, 0));
        assert_eq!(packed.entries[1].scheduled_time, hm(15, 0));
        assert_eq!(packed.remaining_minutes, 0);
    }
}
