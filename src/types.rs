//! Core domain types for wikipath.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which link relation of an article to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Outgoing links: articles this article links to.
    Forward,
    /// Incoming links: articles that link to this article.
    Backward,
}

impl Direction {
    /// Name of the relation as the MediaWiki API calls it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "links",
            Self::Backward => "backlinks",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One article and the link edges known for it.
///
/// A `Node` is a snapshot read from the store. Once a direction is marked
/// fetched its edge set is complete and never re-queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub identifier: String,
    pub forward_fetched: bool,
    pub backward_fetched: bool,
    pub forward_links: BTreeSet<String>,
    pub backward_links: BTreeSet<String>,
}

impl Node {
    /// A freshly referenced node: nothing fetched, no edges.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            forward_fetched: false,
            backward_fetched: false,
            forward_links: BTreeSet::new(),
            backward_links: BTreeSet::new(),
        }
    }

    pub fn is_fetched(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward_fetched,
            Direction::Backward => self.backward_fetched,
        }
    }

    pub fn links(&self, direction: Direction) -> &BTreeSet<String> {
        match direction {
            Direction::Forward => &self.forward_links,
            Direction::Backward => &self.backward_links,
        }
    }
}

// ---------------------------------------------------------------------------
// Title normalization
// ---------------------------------------------------------------------------

/// Turn a raw article title into a node identifier.
///
/// Each run of whitespace becomes a single underscore and leading/trailing
/// whitespace is dropped. Case is preserved: article titles are
/// case-sensitive. The store never calls this; callers normalize before
/// handing identifiers over.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Foo Bar", "Foo_Bar" ; "single space")]
    #[test_case("Foo   Bar", "Foo_Bar" ; "space run")]
    #[test_case("Foo \t\n Bar", "Foo_Bar" ; "mixed whitespace run")]
    #[test_case("  Foo Bar  ", "Foo_Bar" ; "outer whitespace trimmed")]
    #[test_case("Foo_Bar", "Foo_Bar" ; "already normalized")]
    #[test_case("iPhone", "iPhone" ; "case preserved")]
    #[test_case("", "" ; "empty")]
    #[test_case("   ", "" ; "whitespace only")]
    fn normalize_title_cases(raw: &str, expected: &str) {
        assert_eq!(normalize_title(raw), expected);
    }

    #[test]
    fn normalize_title_keeps_existing_underscores() {
        // Underscores are not whitespace, so "a_ b" keeps both separators.
        assert_eq!(normalize_title("a_ b"), "a__b");
    }

    #[test]
    fn direction_names_match_api_relations() {
        assert_eq!(Direction::Forward.as_str(), "links");
        assert_eq!(Direction::Backward.as_str(), "backlinks");
    }

    #[test]
    fn new_node_is_unfetched_and_empty() {
        let node = Node::new("Rust");
        assert_eq!(node.identifier, "Rust");
        assert!(!node.is_fetched(Direction::Forward));
        assert!(!node.is_fetched(Direction::Backward));
        assert!(node.links(Direction::Forward).is_empty());
        assert!(node.links(Direction::Backward).is_empty());
    }
}
