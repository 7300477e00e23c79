//! Database layer for smartplan: models, connection pool management,
//! embedded migrations, and query functions.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
