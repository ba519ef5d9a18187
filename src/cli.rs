//! Command-line surface: parse two titles, run the search, render the chain.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{CliOverrides, WikiPathConfig};
use crate::error::{Result, WikiPathError};
use crate::graph::{BidirectionalSearch, LinkResolver, NodeStore, SearchLimits, SearchOutcome};
use crate::source::{LinkSource, WikiApiConfig, WikiApiSource};
use crate::types::normalize_title;

/// Find a shortest chain of links between two Wikipedia articles.
#[derive(Debug, Parser)]
#[command(name = "wikipath", version, about)]
pub struct Cli {
    /// Article to start from.
    pub source: String,

    /// Article to reach.
    pub target: String,

    /// SQLite link cache (defaults to the platform data directory).
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// YAML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// MediaWiki api.php endpoint.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Stop after this many expansion rounds.
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Stop after fetching this many articles from the API.
    #[arg(long)]
    pub max_fetches: Option<u64>,

    /// Worker threads for expanding a frontier.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Give up after this many seconds (checked between rounds).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    /// Debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            api_url: self.api_url.clone(),
            db_path: self.db.clone(),
            max_rounds: self.max_rounds,
            max_fetches: self.max_fetches,
            threads: self.threads,
            timeout_secs: self.timeout,
        }
    }
}

/// Load config, open the cache, and search against the live API.
pub fn run(cli: &Cli) -> Result<String> {
    let config = WikiPathConfig::load(cli.config.as_deref(), &cli.overrides())?;
    let store = open_store(&config)?;
    let source = WikiApiSource::new(WikiApiConfig::from(&config.api))?;
    let outcome = search(&config, &store, &source, &cli.source, &cli.target)?;
    let cache = store.stats()?;
    tracing::info!(
        nodes = cache.nodes,
        edges = cache.edges,
        forward_fetched = cache.forward_fetched,
        backward_fetched = cache.backward_fetched,
        "link cache"
    );
    render(&outcome, cli.json)
}

/// Normalize both titles and run one search over `store` and `source`.
pub fn search(
    config: &WikiPathConfig,
    store: &NodeStore,
    source: &dyn LinkSource,
    raw_source: &str,
    raw_target: &str,
) -> Result<SearchOutcome> {
    let from = normalize_title(raw_source);
    let to = normalize_title(raw_target);
    if from.is_empty() || to.is_empty() {
        return Err(WikiPathError::Config("article titles must not be empty".into()));
    }

    tracing::info!(from = %from, to = %to, "searching");
    let resolver = LinkResolver::new(store, source);
    let outcome = BidirectionalSearch::new(&resolver)
        .with_limits(SearchLimits::from_config(&config.search))
        .with_threads(config.search.threads)?
        .find_path(&from, &to)?;
    Ok(outcome)
}

pub fn render(outcome: &SearchOutcome, json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(outcome)?)
    } else {
        Ok(outcome.render())
    }
}

fn open_store(config: &WikiPathConfig) -> Result<NodeStore> {
    let path = config.resolved_db_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let path_str = path
        .to_str()
        .ok_or_else(|| WikiPathError::Config(format!("non UTF-8 db path: {}", path.display())))?;
    tracing::debug!(db = path_str, "opening link cache");
    NodeStore::open(path_str)
}
