//! Search paths and frontiers.
//!
//! A frontier holds at most one path per current node. Identity is the
//! current (last) identifier alone; how the path got there is irrelevant
//! for membership. When two paths reach the same node the shorter one is
//! kept, and equal lengths keep the lexicographically smaller chain.

use std::collections::HashMap;

use crate::types::Direction;

// ---------------------------------------------------------------------------
// SearchPath
// ---------------------------------------------------------------------------

/// Identifiers from a frontier's root to its current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    nodes: Vec<String>,
}

impl SearchPath {
    pub fn root(identifier: impl Into<String>) -> Self {
        Self {
            nodes: vec![identifier.into()],
        }
    }

    /// The frontier position of this path.
    pub fn current(&self) -> &str {
        // Paths are built from `root` and only ever grow.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Number of nodes on the path (edges + 1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// A new path one step further, leaving `self` untouched.
    pub fn extend(&self, next: impl Into<String>) -> Self {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend(self.nodes.iter().cloned());
        nodes.push(next.into());
        Self { nodes }
    }

    /// Ordering used when two paths compete for the same slot.
    fn beats(&self, other: &SearchPath) -> bool {
        (self.len(), &self.nodes) < (other.len(), &other.nodes)
    }
}

/// Join a source-side path and a target-side path that share their
/// current node into one chain from source root to target root.
pub fn join_paths(source_side: &SearchPath, target_side: &SearchPath) -> Vec<String> {
    debug_assert_eq!(source_side.current(), target_side.current());
    let mut chain = source_side.nodes.clone();
    chain.extend(target_side.nodes.iter().rev().skip(1).cloned());
    chain
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// All paths grown from one endpoint, keyed by current node.
#[derive(Debug, Clone)]
pub struct Frontier {
    direction: Direction,
    paths: HashMap<String, SearchPath>,
    /// Current nodes added since the last expansion.
    boundary: Vec<String>,
}

impl Frontier {
    /// A frontier holding only the root path, growing along `direction`.
    pub fn new(root: &str, direction: Direction) -> Self {
        let mut paths = HashMap::new();
        paths.insert(root.to_string(), SearchPath::root(root));
        Self {
            direction,
            paths,
            boundary: vec![root.to_string()],
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn path_to(&self, identifier: &str) -> Option<&SearchPath> {
        self.paths.get(identifier)
    }

    pub fn paths(&self) -> impl Iterator<Item = &SearchPath> {
        self.paths.values()
    }

    /// Nodes whose neighbors have not been explored yet.
    pub fn boundary(&self) -> &[String] {
        &self.boundary
    }

    /// Nothing left to expand: every node reachable from the root is known.
    pub fn is_exhausted(&self) -> bool {
        self.boundary.is_empty()
    }

    /// Hand over the boundary for expansion, sorted for deterministic merges.
    pub fn take_boundary(&mut self) -> Vec<String> {
        let mut boundary = std::mem::take(&mut self.boundary);
        boundary.sort();
        boundary
    }

    /// Add `path` unless a better path to the same node is already held.
    /// Returns `true` when `path` was stored.
    pub fn offer(&mut self, path: SearchPath) -> bool {
        match self.paths.get_mut(path.current()) {
            Some(existing) => {
                if path.beats(existing) {
                    // A node already present can only be beaten by a path of
                    // the same round, so it is already on the boundary.
                    *existing = path;
                    true
                } else {
                    false
                }
            }
            None => {
                self.boundary.push(path.current().to_string());
                self.paths.insert(path.current().to_string(), path);
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
