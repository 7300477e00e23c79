//! Query functions, one module per table family.

pub mod categories;
pub mod notifications;
pub mod plan_entries;
pub mod tasks;
pub mod users;
