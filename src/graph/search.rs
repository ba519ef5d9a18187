//! Bidirectional frontier search between two articles.
//!
//! The source frontier grows along forward links from the source article,
//! the target frontier along backward links from the target article. A
//! chain is found as soon as some node is the current node of a path on
//! both sides. Each round first probes for such a meeting point and then
//! widens both frontiers by one hop.
//!
//! Frontiers keep the shortest path per node and only the nodes added by
//! the previous expansion are expanded again, so after round `r` every
//! node within `r + 1` hops of either endpoint is known with its distance.
//! The first meeting round therefore contains a globally shortest chain,
//! and picking the candidate with the smallest total length returns it.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::{NoPathReason, Result, WikiPathError};
use crate::graph::frontier::{join_paths, Frontier};
use crate::graph::resolver::{LinkResolver, ResolverStats};
use crate::types::Direction;

// ---------------------------------------------------------------------------
// Limits and cancellation
// ---------------------------------------------------------------------------

/// Shared flag a caller can raise to stop a search between rounds.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// When to give up. All checks run between rounds, never mid-round.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub max_rounds: Option<u32>,
    /// Budget of remote fetches; the round that crosses it still completes.
    pub max_fetches: Option<u64>,
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelFlag>,
}

impl SearchLimits {
    /// No limits: runs until a chain is found or a frontier is exhausted.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
            max_fetches: config.max_fetches,
            deadline: config
                .timeout_secs
                .map(|secs| Instant::now() + std::time::Duration::from_secs(secs)),
            cancel: None,
        }
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_max_fetches(mut self, fetches: u64) -> Self {
        self.max_fetches = Some(fetches);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// A connecting chain and how much work it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// Identifiers from source to target, inclusive.
    pub chain: Vec<String>,
    /// Expansion rounds run before the meeting point was seen.
    pub rounds: u32,
    pub source_frontier: usize,
    pub target_frontier: usize,
    pub stats: ResolverStats,
}

impl SearchOutcome {
    /// The chain as `A -> B -> C`.
    pub fn render(&self) -> String {
        self.chain.join(" -> ")
    }

    /// Number of hyperlinks followed.
    pub fn hops(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }
}

// ---------------------------------------------------------------------------
// BidirectionalSearch
// ---------------------------------------------------------------------------

/// Runs the bidirectional search over a [`LinkResolver`].
pub struct BidirectionalSearch<'r, 'a> {
    resolver: &'r LinkResolver<'a>,
    limits: SearchLimits,
    pool: Option<rayon::ThreadPool>,
}

impl<'r, 'a> BidirectionalSearch<'r, 'a> {
    pub fn new(resolver: &'r LinkResolver<'a>) -> Self {
        Self {
            resolver,
            limits: SearchLimits::default(),
            pool: None,
        }
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Expand nodes on a dedicated pool of `threads` workers instead of
    /// the global rayon pool. `0` keeps the global pool.
    pub fn with_threads(mut self, threads: usize) -> Result<Self> {
        if threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("wikipath-expand-{i}"))
                .build()
                .map_err(|e| WikiPathError::Other(format!("cannot build thread pool: {e}")))?;
            self.pool = Some(pool);
        }
        Ok(self)
    }

    /// Find a chain of links from `source` to `target`.
    ///
    /// Both arguments are node identifiers (already normalized).
    pub fn find_path(&self, source: &str, target: &str) -> Result<SearchOutcome> {
        let store = self.resolver.store();
        store.get_or_create(source)?;
        store.get_or_create(target)?;

        // Init: each root plus its one-hop neighbors.
        let mut sources = Frontier::new(source, Direction::Forward);
        let mut targets = Frontier::new(target, Direction::Backward);
        self.expand(&mut sources)?;
        self.expand(&mut targets)?;

        let mut round: u32 = 0;
        loop {
            tracing::info!(
                round,
                source_frontier = sources.len(),
                target_frontier = targets.len(),
                "probing frontiers"
            );

            if let Some(chain) = probe(&sources, &targets) {
                tracing::info!(round, hops = chain.len() - 1, "meeting point found");
                return Ok(SearchOutcome {
                    chain,
                    rounds: round,
                    source_frontier: sources.len(),
                    target_frontier: targets.len(),
                    stats: self.resolver.stats(),
                });
            }

            self.check_limits(source, target, round, &sources, &targets)?;

            // Target side first, then source side.
            self.expand(&mut targets)?;
            self.expand(&mut sources)?;
            round += 1;
        }
    }

    fn check_limits(
        &self,
        source: &str,
        target: &str,
        round: u32,
        sources: &Frontier,
        targets: &Frontier,
    ) -> Result<()> {
        let no_path = |reason| WikiPathError::NoPathFound {
            from: source.to_string(),
            to: target.to_string(),
            rounds: round,
            reason,
        };

        if sources.is_exhausted() || targets.is_exhausted() {
            return Err(no_path(NoPathReason::FrontierExhausted));
        }
        if self.limits.max_rounds.is_some_and(|max| round >= max) {
            return Err(no_path(NoPathReason::RoundLimit));
        }
        if self
            .limits
            .max_fetches
            .is_some_and(|max| self.resolver.stats().remote_fetches >= max)
        {
            return Err(no_path(NoPathReason::FetchBudget));
        }
        let cancelled = self.limits.cancel.as_ref().is_some_and(CancelFlag::is_cancelled);
        let expired = self.limits.deadline.is_some_and(|d| Instant::now() >= d);
        if cancelled || expired {
            return Err(WikiPathError::Cancelled { rounds: round });
        }
        Ok(())
    }

    /// Grow `frontier` by one hop from its boundary.
    ///
    /// Distinct boundary nodes are resolved in parallel; the results are
    /// merged one at a time in sorted order.
    fn expand(&self, frontier: &mut Frontier) -> Result<()> {
        let boundary = frontier.take_boundary();
        if boundary.is_empty() {
            return Ok(());
        }
        let direction = frontier.direction();

        let resolve = || {
            boundary
                .par_iter()
                .map(|id| {
                    self.resolver
                        .links_of(id, direction)
                        .map(|links| (id.as_str(), links))
                })
                .collect::<Result<Vec<(&str, BTreeSet<String>)>>>()
        };
        let resolved = match &self.pool {
            Some(pool) => pool.install(resolve)?,
            None => resolve()?,
        };

        let mut added = 0usize;
        for (id, links) in resolved {
            let Some(base) = frontier.path_to(id).cloned() else {
                continue;
            };
            for next in links {
                if frontier.offer(base.extend(next)) {
                    added += 1;
                }
            }
        }

        tracing::debug!(
            %direction,
            expanded = boundary.len(),
            added,
            frontier = frontier.len(),
            "frontier expanded"
        );
        Ok(())
    }
}

/// Best chain through any node present in both frontiers: fewest nodes,
/// then lexicographically smallest.
fn probe(sources: &Frontier, targets: &Frontier) -> Option<Vec<String>> {
    sources
        .paths()
        .filter_map(|sp| targets.path_to(sp.current()).map(|tp| join_paths(sp, tp)))
        .min_by(|a, b| (a.len(), a).cmp(&(b.len(), b)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
