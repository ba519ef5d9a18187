//! End-to-end tests: search over an on-disk cache with an in-memory link
//! source standing in for the MediaWiki API.

use wikipath::cli::search;
use wikipath::config::WikiPathConfig;
use wikipath::error::{NoPathReason, WikiPathError};
use wikipath::graph::{BidirectionalSearch, LinkResolver, NodeStore, SearchLimits};
use wikipath::source::StaticLinkSource;
use wikipath::types::Direction;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A small slice of an encyclopedia with a 4-hop shortest chain from
/// "Hellenic historiography" to "Cholistan Desert".
fn encyclopedia() -> StaticLinkSource {
    StaticLinkSource::from_edges(&[
        ("Hellenic historiography", "Herodotus"),
        ("Hellenic historiography", "Thucydides"),
        ("Herodotus", "Persian Empire"),
        ("Thucydides", "Peloponnesian War"),
        ("Persian Empire", "Indus River"),
        ("Peloponnesian War", "Sparta"),
        ("Indus River", "Cholistan Desert"),
        ("Punjab", "Cholistan Desert"),
        ("Sparta", "Punjab"),
        ("Punjab", "Indus River"),
    ])
    .with_page_size(1)
}

fn db_path(dir: &TempDir) -> String {
    dir.path().join("wikipath.db").to_str().unwrap().to_string()
}

// ===========================================================================
// Searches
// ===========================================================================

#[test]
fn finds_shortest_chain_between_raw_titles() {
    let dir = TempDir::new().unwrap();
    let store = NodeStore::open(&db_path(&dir)).unwrap();
    let source = encyclopedia();

    let outcome = search(
        &WikiPathConfig::default(),
        &store,
        &source,
        "Hellenic historiography",
        "Cholistan Desert",
    )
    .unwrap();

    assert_eq!(
        outcome.render(),
        "Hellenic_historiography -> Herodotus -> Persian_Empire -> Indus_River -> Cholistan_Desert"
    );
    assert_eq!(outcome.hops(), 4);
}

#[test]
fn second_run_over_same_database_makes_no_remote_queries() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let source = encyclopedia();

    let first = {
        let store = NodeStore::open(&path).unwrap();
        search(&WikiPathConfig::default(), &store, &source, "Hellenic historiography", "Cholistan Desert")
            .unwrap()
    };
    let queries_after_first = source.query_count();
    assert!(queries_after_first > 0);

    let store = NodeStore::open(&path).unwrap();
    let second = search(&WikiPathConfig::default(), &store, &source, "Hellenic historiography", "Cholistan Desert")
        .unwrap();

    assert_eq!(first.chain, second.chain);
    assert_eq!(source.query_count(), queries_after_first);
    assert_eq!(second.stats.remote_fetches, 0);
    assert!(second.stats.cache_hits > 0);
}

#[test]
fn paginated_neighbors_are_fetched_once_per_node() {
    let dir = TempDir::new().unwrap();
    let store = NodeStore::open(&db_path(&dir)).unwrap();
    let source = encyclopedia();

    search(&WikiPathConfig::default(), &store, &source, "Hellenic historiography", "Cholistan Desert")
        .unwrap();

    // Page size 1 and two links: exactly two page queries, one fetch.
    assert_eq!(source.queries_for("Hellenic_historiography", Direction::Forward), 2);
    let node = store.get("Hellenic_historiography").unwrap().unwrap();
    assert!(node.forward_fetched);
    assert_eq!(node.forward_links.len(), 2);
}

#[test]
fn unreachable_target_reports_no_path() {
    let store = NodeStore::in_memory().unwrap();
    let source = StaticLinkSource::from_edges(&[("Island", "Lagoon"), ("Mainland", "Harbor")]);
    let resolver = LinkResolver::new(&store, &source);

    let err = BidirectionalSearch::new(&resolver)
        .find_path("Island", "Harbor")
        .unwrap_err();
    match err {
        WikiPathError::NoPathFound { from, to, reason, .. } => {
            assert_eq!(from, "Island");
            assert_eq!(to, "Harbor");
            assert_eq!(reason, NoPathReason::FrontierExhausted);
        }
        other => panic!("expected NoPathFound, got {other:?}"),
    }
}

#[test]
fn round_ceiling_from_config_is_honored() {
    let store = NodeStore::in_memory().unwrap();
    let source = encyclopedia();
    let mut config = WikiPathConfig::default();
    config.search.max_rounds = Some(0);

    let err = search(&config, &store, &source, "Hellenic historiography", "Cholistan Desert")
        .unwrap_err();
    assert!(matches!(
        err,
        WikiPathError::NoPathFound {
            rounds: 0,
            reason: NoPathReason::RoundLimit,
            ..
        }
    ));
}

#[test]
fn interrupted_search_keeps_fetched_links_for_the_next_run() {
    let store = NodeStore::in_memory().unwrap();
    let source = encyclopedia();

    {
        let resolver = LinkResolver::new(&store, &source);
        let result = BidirectionalSearch::new(&resolver)
            .with_limits(SearchLimits::unbounded().with_max_rounds(0))
            .find_path("Hellenic_historiography", "Cholistan_Desert");
        assert!(result.is_err());
    }
    let stats = store.stats().unwrap();
    assert_eq!(stats.forward_fetched, 1);
    assert_eq!(stats.backward_fetched, 1);

    let resolver = LinkResolver::new(&store, &source);
    let outcome = BidirectionalSearch::new(&resolver)
        .find_path("Hellenic_historiography", "Cholistan_Desert")
        .unwrap();
    assert_eq!(outcome.hops(), 4);
    // The two root expansions came from the cache.
    assert_eq!(outcome.stats.cache_hits, 2);
}
