//! In-memory link source over a fixed edge list.
//!
//! Serves pages of at most `page_size` titles with numeric offsets as
//! continuation tokens, and counts every query so callers can check how
//! often the remote side was hit. Used for fixtures and tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::source::{LinkPage, LinkSource, SourceError};
use crate::types::{normalize_title, Direction};

/// A static directed graph answering link queries page by page.
///
/// Articles are keyed by normalized identifier; the titles handed back are
/// the raw strings the edges were declared with.
#[derive(Debug)]
pub struct StaticLinkSource {
    forward: BTreeMap<String, Vec<String>>,
    backward: BTreeMap<String, Vec<String>>,
    ambiguous: BTreeSet<String>,
    page_size: usize,
    queries: AtomicUsize,
    per_title: Mutex<HashMap<(String, Direction), usize>>,
}

impl Default for StaticLinkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticLinkSource {
    pub fn new() -> Self {
        Self {
            forward: BTreeMap::new(),
            backward: BTreeMap::new(),
            ambiguous: BTreeSet::new(),
            page_size: 500,
            queries: AtomicUsize::new(0),
            per_title: Mutex::new(HashMap::new()),
        }
    }

    /// Build from `(from, to)` pairs.
    pub fn from_edges(edges: &[(&str, &str)]) -> Self {
        let mut source = Self::new();
        for (from, to) in edges {
            source.add_edge(from, to);
        }
        source
    }

    /// Cap each page at `page_size` titles (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Declare an article that exists but has no links either way.
    pub fn with_article(mut self, title: &str) -> Self {
        self.add_article(title);
        self
    }

    /// Make queries for `title` fail as ambiguous.
    pub fn with_ambiguous(mut self, title: &str) -> Self {
        self.ambiguous.insert(normalize_title(title));
        self
    }

    pub fn add_article(&mut self, title: &str) {
        let key = normalize_title(title);
        self.forward.entry(key.clone()).or_default();
        self.backward.entry(key).or_default();
    }

    /// Add the hyperlink `from -> to`. Both ends become existing articles.
    /// Declaring the same edge twice makes it show up twice in the pages,
    /// like a source that repeats a title across page boundaries.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.add_article(from);
        self.add_article(to);
        self.forward
            .entry(normalize_title(from))
            .or_default()
            .push(to.to_string());
        self.backward
            .entry(normalize_title(to))
            .or_default()
            .push(from.to_string());
    }

    /// Total queries served (including failed ones).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Queries served for one article in one direction.
    pub fn queries_for(&self, title: &str, direction: Direction) -> usize {
        self.per_title
            .lock()
            .map(|m| m.get(&(title.to_string(), direction)).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn record(&self, title: &str, direction: Direction) {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut m) = self.per_title.lock() {
            *m.entry((title.to_string(), direction)).or_insert(0) += 1;
        }
    }
}

impl LinkSource for StaticLinkSource {
    fn query(
        &self,
        title: &str,
        direction: Direction,
        continuation: Option<&str>,
    ) -> Result<LinkPage, SourceError> {
        self.record(title, direction);

        if self.ambiguous.contains(title) {
            return Err(SourceError::Ambiguous { matches: 2 });
        }
        let table = match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        };
        let all = table.get(title).ok_or(SourceError::NotFound)?;

        let start = match continuation {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| SourceError::Transport(format!("bad continuation token '{token}'")))?,
            None => 0,
        };
        let end = (start + self.page_size).min(all.len());
        let titles = all.get(start..end).unwrap_or_default().to_vec();
        let next = (end < all.len()).then(|| end.to_string());

        Ok(LinkPage { titles, next })
    }
}
