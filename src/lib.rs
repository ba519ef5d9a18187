//! wikipath — shortest hyperlink chains between Wikipedia articles.
//!
//! Articles are nodes and hyperlinks are directed edges of a graph that is
//! only discoverable one paginated API query at a time. A bidirectional
//! search grows one frontier forward from the source and one backward from
//! the target until they meet, while a SQLite cache makes sure no article's
//! links are ever fetched twice.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod observability;
pub mod source;
pub mod types;
