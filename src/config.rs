//! Registry configuration.
//!
//! Built with the `with_*` methods or read from the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `CACHE_TTL_SECONDS` | `43200` | Snapshot freshness window |
//! | `REMOTE_URL` | unset | Remote dataset, used only without a local file |
//! | `REMOTE_TIMEOUT_SECONDS` | `15` | Remote fetch deadline |
//! | `SNAPSHOT_PATH` | `gov.json` | Local snapshot file |
//! | `VERIFY_CACHE_SIZE` | `1024` | Per-snapshot lookup cache, 0 disables |
//! | `KEYWORDS_PATH` | unset | JSON [`Vocabulary`] file |

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RegistryError, Result};
use crate::index::{Vocabulary, DEFAULT_LOOKUP_CACHE_SIZE};
use crate::source::{AutoLoader, DEFAULT_REMOTE_TIMEOUT};

pub const ENV_CACHE_TTL_SECONDS: &str = "CACHE_TTL_SECONDS";
pub const ENV_REMOTE_URL: &str = "REMOTE_URL";
pub const ENV_REMOTE_TIMEOUT_SECONDS: &str = "REMOTE_TIMEOUT_SECONDS";
pub const ENV_SNAPSHOT_PATH: &str = "SNAPSHOT_PATH";
pub const ENV_VERIFY_CACHE_SIZE: &str = "VERIFY_CACHE_SIZE";
pub const ENV_KEYWORDS_PATH: &str = "KEYWORDS_PATH";

/// Default snapshot freshness window: 12 hours
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default local snapshot file
pub const DEFAULT_SNAPSHOT_PATH: &str = "gov.json";

/// Registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub snapshot_path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub remote_timeout: Duration,
    pub cache_ttl: Duration,
    pub lookup_cache_size: usize,
    pub vocabulary: Vocabulary,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            snapshot_path: Some(PathBuf::from(DEFAULT_SNAPSHOT_PATH)),
            remote_url: None,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            lookup_cache_size: DEFAULT_LOOKUP_CACHE_SIZE,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl RegistryConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read config from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read config through a variable lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(secs) = get(ENV_CACHE_TTL_SECONDS) {
            config.cache_ttl = Duration::from_secs(parse_number(ENV_CACHE_TTL_SECONDS, &secs)?);
        }
        if let Some(secs) = get(ENV_REMOTE_TIMEOUT_SECONDS) {
            config.remote_timeout =
                Duration::from_secs(parse_number(ENV_REMOTE_TIMEOUT_SECONDS, &secs)?);
        }
        if let Some(size) = get(ENV_VERIFY_CACHE_SIZE) {
            config.lookup_cache_size = parse_number(ENV_VERIFY_CACHE_SIZE, &size)?;
        }
        config.remote_url = get(ENV_REMOTE_URL);
        if let Some(path) = get(ENV_SNAPSHOT_PATH) {
            config.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get(ENV_KEYWORDS_PATH) {
            config.vocabulary = Vocabulary::from_path(path)?;
        }

        Ok(config)
    }

    /// Set local snapshot file
    pub fn with_snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disable the local snapshot file
    pub fn without_snapshot_path(mut self) -> Self {
        self.snapshot_path = None;
        self
    }

    /// Set remote fallback URL
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    /// Set remote fetch deadline
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Set freshness window
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set lookup cache size
    pub fn with_lookup_cache_size(mut self, size: usize) -> Self {
        self.lookup_cache_size = size;
        self
    }

    /// Set classification vocabulary
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary.normalized();
        self
    }

    /// Loader for the configured file and remote sources
    pub fn auto_loader(&self) -> AutoLoader {
        let mut loader = AutoLoader::new().with_timeout(self.remote_timeout);
        if let Some(ref path) = self.snapshot_path {
            loader = loader.with_snapshot_path(path);
        }
        if let Some(ref url) = self.remote_url {
            loader = loader.with_remote_url(url.clone());
        }
        loader
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| RegistryError::ConfigError(format!("{} must be a non-negative integer, got {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(43200));
        assert_eq!(config.remote_timeout, Duration::from_secs(15));
        assert_eq!(config.remote_url, None);
        assert_eq!(config.snapshot_path, Some(PathBuf::from("gov.json")));
        assert_eq!(config.lookup_cache_size, DEFAULT_LOOKUP_CACHE_SIZE);
        assert_eq!(config.vocabulary, Vocabulary::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = RegistryConfig::from_lookup(lookup(&[
            ("CACHE_TTL_SECONDS", "60"),
            ("REMOTE_URL", "https://example.org/gov.json"),
            ("REMOTE_TIMEOUT_SECONDS", " 5 "),
            ("SNAPSHOT_PATH", "/srv/data/gov.json"),
            ("VERIFY_CACHE_SIZE", "0"),
        ]))
        .unwrap();

        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.remote_timeout, Duration::from_secs(5));
        assert_eq!(config.remote_url.as_deref(), Some("https://example.org/gov.json"));
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/srv/data/gov.json")));
        assert_eq!(config.lookup_cache_size, 0);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = RegistryConfig::from_lookup(lookup(&[
            ("CACHE_TTL_SECONDS", ""),
            ("REMOTE_URL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.cache_ttl, DEFAULT_CACHE_TTL);
        assert_eq!(config.remote_url, None);
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = RegistryConfig::from_lookup(lookup(&[("CACHE_TTL_SECONDS", "12h")])).unwrap_err();
        match err {
            RegistryError::ConfigError(message) => {
                assert!(message.contains("CACHE_TTL_SECONDS"), "got: {}", message);
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }

        assert!(RegistryConfig::from_lookup(lookup(&[("REMOTE_TIMEOUT_SECONDS", "-1")])).is_err());
    }

    #[test]
    fn test_auto_loader_from_config() {
        let loader = RegistryConfig::new()
            .with_snapshot_path("/srv/gov.json")
            .with_remote_url("https://example.org/gov.json")
            .with_remote_timeout(Duration::from_secs(7))
            .auto_loader();

        assert_eq!(loader.snapshot_path, Some(PathBuf::from("/srv/gov.json")));
        assert_eq!(loader.remote_url.as_deref(), Some("https://example.org/gov.json"));
        assert_eq!(loader.timeout, Duration::from_secs(7));

        let loader = RegistryConfig::new().without_snapshot_path().auto_loader();
        assert!(loader.snapshot_path.is_none());
    }

    #[test]
    fn test_with_vocabulary_normalizes() {
        let vocabulary = Vocabulary {
            apex: " GOV.PL. ".to_string(),
            central: ["  MF "].iter().map(|k| k.to_string()).collect(),
            ..Vocabulary::default()
        };
        let config = RegistryConfig::new().with_vocabulary(vocabulary);

        assert_eq!(config.vocabulary.apex, "gov.pl");
        assert!(config.vocabulary.central.contains("mf"));
        assert!(config.vocabulary.is_gov_domain("mf.gov.pl"));
        assert_eq!(
            config.vocabulary.infer_category("mf.gov.pl"),
            crate::types::Category::CentralAdministration
        );
    }
}
