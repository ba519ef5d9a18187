//! Link sources — where neighbor titles come from.
//!
//! A [`LinkSource`] answers one paginated question: "give me the next page
//! of `direction` links for this article". The resolver owns the
//! pagination loop, caching, and normalization; sources only speak their
//! wire protocol.

pub mod memory;
pub mod wiki_api;

use thiserror::Error;

use crate::types::Direction;

pub use memory::StaticLinkSource;
pub use wiki_api::{WikiApiConfig, WikiApiSource};

/// One page of neighbor titles as returned by the remote source.
///
/// Titles are raw (not normalized). `next` carries the continuation token
/// when more pages remain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPage {
    pub titles: Vec<String>,
    pub next: Option<String>,
}

/// Failures a link source must be able to tell apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("no article matched")]
    NotFound,

    #[error("{matches} articles matched")]
    Ambiguous { matches: usize },

    #[error("{0}")]
    Transport(String),
}

/// A paginated provider of article links.
pub trait LinkSource: Send + Sync {
    /// Fetch one page of `direction` links for `title`, resuming from
    /// `continuation` when given.
    fn query(
        &self,
        title: &str,
        direction: Direction,
        continuation: Option<&str>,
    ) -> Result<LinkPage, SourceError>;
}
