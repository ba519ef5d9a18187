//! Error types for wikipath.
//!
//! Every failure propagates to the caller; nothing in the search core is
//! caught and logged. Either a complete chain is produced or the run fails.

use thiserror::Error;

use crate::types::Direction;

/// The link source could not pin a title to exactly one article.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeResolutionError {
    #[error("article '{title}' does not exist")]
    NotFound { title: String },

    #[error("article '{title}' is ambiguous: {matches} pages matched")]
    Ambiguous { title: String, matches: usize },
}

/// Why a search ended without a connecting chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPathReason {
    /// One side has no unexpanded nodes left, so its reachable set is complete.
    FrontierExhausted,
    /// The configured `max_rounds` ceiling was reached.
    RoundLimit,
    /// The configured `max_fetches` budget of remote expansions was spent.
    FetchBudget,
}

impl std::fmt::Display for NoPathReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::FrontierExhausted => "frontier exhausted",
            Self::RoundLimit => "round limit reached",
            Self::FetchBudget => "fetch budget exhausted",
        })
    }
}

#[derive(Debug, Error)]
pub enum WikiPathError {
    #[error(transparent)]
    NodeResolution(#[from] NodeResolutionError),

    #[error("transport error fetching {direction} of '{title}': {reason}")]
    Transport {
        title: String,
        direction: Direction,
        reason: String,
    },

    #[error("no path from '{from}' to '{to}' after {rounds} rounds ({reason})")]
    NoPathFound {
        from: String,
        to: String,
        rounds: u32,
        reason: NoPathReason,
    },

    #[error("search cancelled after {rounds} rounds")]
    Cancelled { rounds: u32 },

    #[error("{direction} of '{title}' were already fetched")]
    AlreadyFetched { title: String, direction: Direction },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WikiPathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_is_transparent() {
        let err: WikiPathError = NodeResolutionError::Ambiguous {
            title: "Mercury".into(),
            matches: 2,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "article 'Mercury' is ambiguous: 2 pages matched"
        );
    }

    #[test]
    fn no_path_message_names_reason() {
        let err = WikiPathError::NoPathFound {
            from: "A".into(),
            to: "B".into(),
            rounds: 3,
            reason: NoPathReason::RoundLimit,
        };
        assert_eq!(
            err.to_string(),
            "no path from 'A' to 'B' after 3 rounds (round limit reached)"
        );
    }

    #[test]
    fn transport_message_names_direction() {
        let err = WikiPathError::Transport {
            title: "Rust".into(),
            direction: Direction::Backward,
            reason: "HTTP 503".into(),
        };
        assert_eq!(
            err.to_string(),
            "transport error fetching backlinks of 'Rust': HTTP 503"
        );
    }
}
