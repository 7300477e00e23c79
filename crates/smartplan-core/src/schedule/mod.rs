//! The plan generator: ranking, greedy packing, and orchestration.

pub mod generator;
pub mod pack;
pub mod rank;

pub use generator::{DayResult, Planner, ValidationError};
pub use pack::{PackedDay, PlannerSettings, ScheduledTask, pack_day};
pub use rank::{rank_candidates, urgency};
