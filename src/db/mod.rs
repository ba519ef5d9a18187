//! Database layer — SQLite schema for the persistent link cache.

pub mod schema;
