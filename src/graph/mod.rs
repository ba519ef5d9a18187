//! Graph layer — SQLite-backed node store, link resolution, and the
//! bidirectional search built on top of them.

pub mod frontier;
pub mod resolver;
pub mod search;
pub mod store;

pub use frontier::{Frontier, SearchPath};
pub use resolver::{LinkResolver, ResolverStats};
pub use search::{BidirectionalSearch, CancelFlag, SearchLimits, SearchOutcome};
pub use store::{NodeStore, StoreStats};
