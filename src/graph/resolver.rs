//! Link resolution with the node store as a write-through cache.
//!
//! A node's links in one direction are fetched from the [`LinkSource`] at
//! most once: the first call walks every page, normalizes the titles and
//! records the full set in the store; later calls read the store.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::{NodeResolutionError, Result, WikiPathError};
use crate::graph::store::NodeStore;
use crate::source::{LinkSource, SourceError};
use crate::types::{normalize_title, Direction, Node};

/// Counters describing how much work hit the remote source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// Node/direction pairs fetched from the source.
    pub remote_fetches: u64,
    /// Individual page queries sent to the source.
    pub pages_requested: u64,
    /// Lookups answered from the store without touching the source.
    pub cache_hits: u64,
}

/// Resolves neighbor sets, consulting the store before the source.
pub struct LinkResolver<'a> {
    store: &'a NodeStore,
    source: &'a dyn LinkSource,
    remote_fetches: AtomicU64,
    pages_requested: AtomicU64,
    cache_hits: AtomicU64,
}

impl<'a> LinkResolver<'a> {
    pub fn new(store: &'a NodeStore, source: &'a dyn LinkSource) -> Self {
        Self {
            store,
            source,
            remote_fetches: AtomicU64::new(0),
            pages_requested: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &NodeStore {
        self.store
    }

    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            pages_requested: self.pages_requested.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }

    pub fn forward_links_of(&self, node: &Node) -> Result<BTreeSet<String>> {
        self.links_of(&node.identifier, Direction::Forward)
    }

    pub fn backward_links_of(&self, node: &Node) -> Result<BTreeSet<String>> {
        self.links_of(&node.identifier, Direction::Backward)
    }

    /// The complete `direction` neighbor set of `identifier`.
    ///
    /// The fetched flag is re-read from the store rather than trusted from
    /// a caller's snapshot, so a stale [`Node`] never causes a refetch.
    /// If any page fails the node stays unfetched and nothing is stored.
    /// When another caller stores the same node/direction first, its set
    /// wins and is returned as a cache hit.
    pub fn links_of(&self, identifier: &str, direction: Direction) -> Result<BTreeSet<String>> {
        let node = self.store.get_or_create(identifier)?;
        if node.is_fetched(direction) {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(node.links(direction).clone());
        }

        let neighbors = self.fetch_all_pages(identifier, direction)?;
        match self.store.mark_fetched(identifier, direction, &neighbors) {
            Ok(_) => {}
            Err(WikiPathError::AlreadyFetched { .. }) => {
                tracing::debug!(title = identifier, %direction, "lost fetch race, using stored links");
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                let node = self.store.get_or_create(identifier)?;
                return Ok(node.links(direction).clone());
            }
            Err(e) => return Err(e),
        }
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);

        tracing::info!("{identifier} - {} {direction}", neighbors.len());
        Ok(neighbors)
    }

    fn fetch_all_pages(&self, identifier: &str, direction: Direction) -> Result<BTreeSet<String>> {
        let mut neighbors = BTreeSet::new();
        let mut continuation: Option<String> = None;

        loop {
            tracing::debug!(
                title = identifier,
                %direction,
                continuation = continuation.as_deref().unwrap_or("-"),
                "requesting link page"
            );
            self.pages_requested.fetch_add(1, Ordering::Relaxed);
            let page = self
                .source
                .query(identifier, direction, continuation.as_deref())
                .map_err(|e| resolution_error(identifier, direction, e))?;

            neighbors.extend(
                page.titles
                    .iter()
                    .map(|t| normalize_title(t))
                    .filter(|t| !t.is_empty()),
            );

            match page.next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        Ok(neighbors)
    }
}

fn resolution_error(identifier: &str, direction: Direction, err: SourceError) -> WikiPathError {
    match err {
        SourceError::NotFound => NodeResolutionError::NotFound {
            title: identifier.to_string(),
        }
        .into(),
        SourceError::Ambiguous { matches } => NodeResolutionError::Ambiguous {
            title: identifier.to_string(),
            matches,
        }
        .into(),
        SourceError::Transport(reason) => WikiPathError::Transport {
            title: identifier.to_string(),
            direction,
            reason,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
