//! Candidate ranking for plan generation.
//!
//! Candidates are ordered by the tuple `(urgency, -priority, duration)`
//! ascending: most urgent first, ties broken by higher priority, remaining
//! ties by shorter duration. The comparator is explicit and the sort is
//! stable, so the ordering is a deterministic total order.

use std::cmp::Ordering;

use chrono::NaiveDate;

use smartplan_db::models::Task;

/// Signed day count from the plan date to the task's deadline.
///
/// Negative means overdue, which ranks as more urgent than zero or any
/// positive value.
pub fn urgency(deadline: NaiveDate, plan_date: NaiveDate) -> i64 {
    (deadline - plan_date).num_days()
}

/// Compare two candidates for a given plan date.
pub fn compare_candidates(a: &Task, b: &Task, plan_date: NaiveDate) -> Ordering {
    urgency(a.deadline, plan_date)
        .cmp(&urgency(b.deadline, plan_date))
        .then_with(|| b.priority.cmp(&a.priority))
        .then_with(|| a.duration_minutes.cmp(&b.duration_minutes))
}

/// Stable-sort candidates into scheduling order for `plan_date`.
pub fn rank_candidates(tasks: &mut [Task], plan_date: NaiveDate) {
    tasks.sort_by(|a, b| compare_candidates(a, b, plan_date));
}
