//! Core logic for smartplan: the plan generator, the store seams it runs
//! against, session management, and password hashing.

pub mod auth;
pub mod schedule;
pub mod session;
pub mod store;
