//! Configuration loading.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags ([`CliOverrides`])
//! 2. Environment variables (`WIKIPATH_*`)
//! 3. YAML file (`--config`, else `<config dir>/config.yaml` when present)
//! 4. Compiled defaults

pub mod schema;

use std::path::{Path, PathBuf};

pub use schema::{ApiConfig, SearchConfig, StorageConfig, WikiPathConfig};

use crate::error::{Result, WikiPathError};

/// Values passed on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub db_path: Option<PathBuf>,
    pub max_rounds: Option<u32>,
    pub max_fetches: Option<u64>,
    pub threads: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl WikiPathConfig {
    /// Load configuration from every layer and validate the result.
    pub fn load(config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_yaml_file(path)?,
            None => match user_config_path() {
                Some(path) if path.exists() => Self::from_yaml_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.apply_cli_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WikiPathError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply `WIKIPATH_*` overrides read through `lookup`.
    /// Unparseable numeric values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("WIKIPATH_API_URL") {
            self.api.endpoint = val;
        }
        if let Some(val) = lookup("WIKIPATH_USER_AGENT") {
            self.api.user_agent = val;
        }
        if let Some(val) = lookup("WIKIPATH_DB") {
            self.storage.db_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("WIKIPATH_MAX_ROUNDS") {
            if let Ok(v) = val.parse::<u32>() {
                self.search.max_rounds = Some(v);
            }
        }
        if let Some(val) = lookup("WIKIPATH_MAX_FETCHES") {
            if let Ok(v) = val.parse::<u64>() {
                self.search.max_fetches = Some(v);
            }
        }
        if let Some(val) = lookup("WIKIPATH_TIMEOUT") {
            if let Ok(v) = val.parse::<u64>() {
                self.search.timeout_secs = Some(v);
            }
        }
        if let Some(val) = lookup("WIKIPATH_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                self.search.threads = v;
            }
        }
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref v) = cli.api_url {
            self.api.endpoint = v.clone();
        }
        if let Some(ref v) = cli.db_path {
            self.storage.db_path = Some(v.clone());
        }
        if let Some(v) = cli.max_rounds {
            self.search.max_rounds = Some(v);
        }
        if let Some(v) = cli.max_fetches {
            self.search.max_fetches = Some(v);
        }
        if let Some(v) = cli.threads {
            self.search.threads = v;
        }
        if let Some(v) = cli.timeout_secs {
            self.search.timeout_secs = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api.endpoint.starts_with("http://") || self.api.endpoint.starts_with("https://")) {
            return Err(WikiPathError::Config(format!(
                "api.endpoint must be an http(s) URL, got '{}'",
                self.api.endpoint
            )));
        }
        if self.api.user_agent.trim().is_empty() {
            return Err(WikiPathError::Config("api.user_agent must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(WikiPathError::Config("api.timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }

    /// SQLite file to open: the configured path, else the platform data
    /// directory, else `wikipath.db` in the working directory.
    pub fn resolved_db_path(&self) -> PathBuf {
        if let Some(ref path) = self.storage.db_path {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "wikipath")
            .map(|dirs| dirs.data_dir().join("wikipath.db"))
            .unwrap_or_else(|| PathBuf::from("wikipath.db"))
    }
}

/// `<config dir>/config.yaml` for the current user.
fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "wikipath").map(|dirs| dirs.config_dir().join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = WikiPathConfig::default();
        config.apply_env_overrides(env(&[
            ("WIKIPATH_API_URL", "https://fr.wikipedia.org/w/api.php"),
            ("WIKIPATH_DB", "/tmp/fr.db"),
            ("WIKIPATH_MAX_ROUNDS", "4"),
            ("WIKIPATH_THREADS", "2"),
        ]));
        assert_eq!(config.api.endpoint, "https://fr.wikipedia.org/w/api.php");
        assert_eq!(config.storage.db_path, Some(PathBuf::from("/tmp/fr.db")));
        assert_eq!(config.search.max_rounds, Some(4));
        assert_eq!(config.search.threads, 2);
    }

    #[test]
    fn env_overrides_search_budgets() {
        let mut config = WikiPathConfig::default();
        config.apply_env_overrides(env(&[
            ("WIKIPATH_MAX_FETCHES", "500"),
            ("WIKIPATH_TIMEOUT", "90"),
        ]));
        assert_eq!(config.search.max_fetches, Some(500));
        assert_eq!(config.search.timeout_secs, Some(90));
    }

    #[test]
    fn unparseable_env_numbers_are_ignored() {
        let mut config = WikiPathConfig::default();
        config.apply_env_overrides(env(&[("WIKIPATH_MAX_ROUNDS", "lots")]));
        assert_eq!(config.search.max_rounds, Some(8));
    }

    #[test]
    fn cli_overrides_beat_env() {
        let mut config = WikiPathConfig::default();
        config.apply_env_overrides(env(&[("WIKIPATH_MAX_ROUNDS", "4")]));
        config.apply_cli_overrides(&CliOverrides {
            max_rounds: Some(2),
            timeout_secs: Some(60),
            ..CliOverrides::default()
        });
        assert_eq!(config.search.max_rounds, Some(2));
        assert_eq!(config.search.timeout_secs, Some(60));
    }

    #[test]
    fn load_reads_explicit_yaml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wikipath.yaml");
        std::fs::write(&path, "search:\n  max_fetches: 250\n").unwrap();

        let config = WikiPathConfig::load(Some(path.as_path()), &CliOverrides::default()).unwrap();
        assert_eq!(config.search.max_fetches, Some(250));
    }

    #[test]
    fn load_missing_explicit_file_is_config_error() {
        let err = WikiPathConfig::load(
            Some(Path::new("/definitely/not/here.yaml")),
            &CliOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, WikiPathError::Config(_)));
    }

    #[test]
    fn invalid_yaml_is_yaml_error() {
        let err = WikiPathConfig::from_yaml_str("search: [unclosed").unwrap_err();
        assert!(matches!(err, WikiPathError::Yaml(_)));
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut config = WikiPathConfig::default();
        config.api.endpoint = "ftp://example.org".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_db_path_wins() {
        let mut config = WikiPathConfig::default();
        config.storage.db_path = Some(PathBuf::from("cache.db"));
        assert_eq!(config.resolved_db_path(), PathBuf::from("cache.db"));
    }

    #[test]
    fn default_db_path_is_named_wikipath_db() {
        let config = WikiPathConfig::default();
        assert_eq!(
            config.resolved_db_path().file_name().and_then(|n| n.to_str()),
            Some("wikipath.db")
        );
    }
}
