//! MediaWiki API link source.
//!
//! Forward links come from `action=query&prop=links`, backward links from
//! `action=query&list=backlinks`. Both are limited to the main (article)
//! namespace and request the maximum page size the API allows; anything
//! beyond that comes back with a `plcontinue`/`blcontinue` token.
//!
//! Transient failures (network errors, 5xx) are retried with exponential
//! backoff. Client errors (4xx) are returned immediately.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::config::ApiConfig;
use crate::error::{Result, WikiPathError};
use crate::source::{LinkPage, LinkSource, SourceError};
use crate::types::Direction;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Connection settings for a MediaWiki endpoint.
#[derive(Debug, Clone)]
pub struct WikiApiConfig {
    /// Full URL of `api.php`.
    pub endpoint: String,
    /// Contact string sent as `Api-User-Agent` and `User-Agent`.
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Initial backoff (doubles each retry).
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for WikiApiConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for WikiApiConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            endpoint: api.endpoint.clone(),
            user_agent: api.user_agent.clone(),
            timeout: Duration::from_secs(api.timeout_secs),
            max_retries: api.max_retries,
            initial_backoff: Duration::from_millis(api.initial_backoff_ms),
            max_backoff: Duration::from_millis(api.max_backoff_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "continue")]
    continuation: Option<Continuation>,
    query: Option<QueryBody>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    plcontinue: Option<String>,
    blcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    pages: Option<HashMap<String, PageEntry>>,
    backlinks: Option<Vec<LinkEntry>>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    title: Option<String>,
    /// Present (as an empty string) when the title has no article.
    missing: Option<serde_json::Value>,
    links: Option<Vec<LinkEntry>>,
}

#[derive(Debug, Deserialize)]
struct LinkEntry {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    #[serde(default)]
    info: String,
}

/// Build the query string for one page of `direction` links.
pub fn query_params(
    title: &str,
    direction: Direction,
    continuation: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("action", "query".to_string()),
        ("format", "json".to_string()),
    ];
    match direction {
        Direction::Forward => {
            params.push(("prop", "links".to_string()));
            params.push(("titles", title.to_string()));
            params.push(("pllimit", "max".to_string()));
            params.push(("plnamespace", "0".to_string()));
            if let Some(token) = continuation {
                params.push(("plcontinue", token.to_string()));
            }
        }
        Direction::Backward => {
            params.push(("list", "backlinks".to_string()));
            params.push(("bltitle", title.to_string()));
            params.push(("bllimit", "max".to_string()));
            params.push(("blnamespace", "0".to_string()));
            if let Some(token) = continuation {
                params.push(("blcontinue", token.to_string()));
            }
        }
    }
    params
}

/// Decode a `prop=links` or `list=backlinks` response body.
///
/// For forward queries exactly one entry must come back under
/// `query.pages`: none is [`SourceError::NotFound`], several is
/// [`SourceError::Ambiguous`]. A page without a `links` field has no links,
/// and that includes entries flagged `missing`: red links are listed by
/// `prop=links` like any other, so their targets resolve to an empty set.
/// A backlinks response without a `backlinks` list has no backlinks.
pub fn parse_response(body: &str, direction: Direction) -> std::result::Result<LinkPage, SourceError> {
    let resp: ApiResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Transport(format!("malformed API response: {e}")))?;

    if let Some(err) = resp.error {
        return Err(SourceError::Transport(format!(
            "API error {}: {}",
            err.code, err.info
        )));
    }

    let titles = match direction {
        Direction::Forward => {
            let pages = resp.query.and_then(|q| q.pages).unwrap_or_default();
            let mut entries = pages.into_values();
            let page = match (entries.next(), entries.len()) {
                (None, _) => return Err(SourceError::NotFound),
                (Some(page), 0) => page,
                (Some(_), rest) => return Err(SourceError::Ambiguous { matches: rest + 1 }),
            };
            if page.missing.is_some() {
                tracing::debug!(
                    title = page.title.as_deref().unwrap_or("-"),
                    "page does not exist, treating as linkless"
                );
            }
            page.links.unwrap_or_default()
        }
        Direction::Backward => resp.query.and_then(|q| q.backlinks).unwrap_or_default(),
    };

    let next = resp.continuation.and_then(|c| match direction {
        Direction::Forward => c.plcontinue,
        Direction::Backward => c.blcontinue,
    });

    Ok(LinkPage {
        titles: titles.into_iter().map(|l| l.title).collect(),
        next,
    })
}

// ---------------------------------------------------------------------------
// WikiApiSource
// ---------------------------------------------------------------------------

/// Blocking MediaWiki client implementing [`LinkSource`].
#[derive(Debug)]
pub struct WikiApiSource {
    client: reqwest::blocking::Client,
    config: WikiApiConfig,
}

impl WikiApiSource {
    pub fn new(config: WikiApiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WikiPathError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// GET `endpoint` with `params`, retrying transient failures.
    fn fetch(&self, params: &[(&'static str, String)]) -> std::result::Result<String, SourceError> {
        let mut backoff = self.config.initial_backoff;
        let mut last_err = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    "wiki api: retry attempt {}/{} after {:?}",
                    attempt,
                    self.config.max_retries,
                    backoff
                );
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(self.config.max_backoff);
            }

            let req = self
                .client
                .get(&self.config.endpoint)
                .query(params)
                .header("Api-User-Agent", &self.config.user_agent);

            match req.send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .text()
                            .map_err(|e| SourceError::Transport(format!("reading body failed: {e}")));
                    }
                    if status.is_client_error() {
                        return Err(SourceError::Transport(format!("HTTP {status}")));
                    }
                    last_err = format!("HTTP {status}");
                }
                Err(e) => {
                    last_err = e.to_string();
                }
            }
        }

        Err(SourceError::Transport(format!(
            "all {} retries exhausted: {last_err}",
            self.config.max_retries
        )))
    }
}

impl LinkSource for WikiApiSource {
    fn query(
        &self,
        title: &str,
        direction: Direction,
        continuation: Option<&str>,
    ) -> std::result::Result<LinkPage, SourceError> {
        tracing::debug!(title, %direction, ?continuation, "calling wiki api");
        let params = query_params(title, direction, continuation);
        let body = self.fetch(&params)?;
        parse_response(&body, direction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
