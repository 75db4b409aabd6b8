use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{RegistryError, Result};

use super::loader::{DatasetLoader, RawPayload};

/// Default deadline for the remote fetch
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(15);

/// Identifying user agent sent with remote fetches
pub const DEFAULT_USER_AGENT: &str = concat!("gov-domain-registry/", env!("CARGO_PKG_VERSION"));

/// Upper bound on a remote dataset body
pub const MAX_REMOTE_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Loader preferring a local snapshot file and falling back to a remote URL
#[derive(Debug, Clone)]
pub struct AutoLoader {
    pub snapshot_path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

impl AutoLoader {
    /// Create a new AutoLoader with no sources configured
    pub fn new() -> Self {
        Self {
            snapshot_path: None,
            remote_url: None,
            timeout: DEFAULT_REMOTE_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set local snapshot file
    pub fn with_snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set remote fallback URL
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    /// Set remote fetch deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    fn local_file(&self) -> Option<&Path> {
        self.snapshot_path
            .as_deref()
            .filter(|path| path.is_file())
    }

    fn read_local(&self, path: &Path) -> Result<RawPayload> {
        debug!(path = %path.display(), "reading local domain snapshot");
        let bytes = fs::read(path)?;
        Ok(RawPayload::new(bytes, format!("file://{}", path.display())))
    }

    fn fetch_remote(&self, url: &str) -> Result<RawPayload> {
        debug!(url, timeout_secs = self.timeout.as_secs(), "fetching remote domain dataset");

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build();
        let agent = ureq::Agent::new_with_config(config);

        let mut response = agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "application/json")
            .call()
            .map_err(|e| RegistryError::fetch(url, format!("request failed: {}", e), e))?;

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_REMOTE_BODY_BYTES)
            .read_to_vec()
            .map_err(|e| RegistryError::fetch(url, format!("reading body failed: {}", e), e))?;

        Ok(RawPayload::new(bytes, url))
    }
}

impl Default for AutoLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetLoader for AutoLoader {
    fn load(&self) -> Result<RawPayload> {
        if let Some(path) = self.local_file() {
            return self.read_local(path);
        }

        match self.remote_url.as_deref() {
            Some(url) => self.fetch_remote(url),
            None => Err(RegistryError::SourceUnavailable {
                path: self.snapshot_path.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("gov_domain_registry_auto_loader");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_auto_loader_builder_pattern() {
        let loader = AutoLoader::new()
            .with_snapshot_path("/tmp/gov.json")
            .with_remote_url("http://example.com/gov.json")
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("test-agent/1.0");

        assert_eq!(loader.snapshot_path, Some(PathBuf::from("/tmp/gov.json")));
        assert_eq!(loader.remote_url.as_deref(), Some("http://example.com/gov.json"));
        assert_eq!(loader.timeout, Duration::from_secs(3));
        assert_eq!(loader.user_agent, "test-agent/1.0");
    }

    #[test]
    fn test_defaults() {
        let loader = AutoLoader::default();
        assert_eq!(loader.timeout, DEFAULT_REMOTE_TIMEOUT);
        assert!(loader.user_agent.starts_with("gov-domain-registry/"));
    }

    #[test]
    fn test_local_file_preferred_over_remote() {
        let path = scratch_file("preferred.json", r#"{"data": []}"#);
        // Unroutable URL: the test fails if the loader ever tries it
        let loader = AutoLoader::new()
            .with_snapshot_path(&path)
            .with_remote_url("http://127.0.0.1:1/never")
            .with_timeout(Duration::from_millis(100));

        let payload = loader.load().unwrap();
        assert_eq!(payload.origin, format!("file://{}", path.display()));
        assert_eq!(payload.bytes, br#"{"data": []}"#.to_vec());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_without_remote_is_unavailable() {
        let loader = AutoLoader::new().with_snapshot_path("/nonexistent/gov.json");
        match loader.load() {
            Err(RegistryError::SourceUnavailable { path }) => {
                assert_eq!(path, Some(PathBuf::from("/nonexistent/gov.json")));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_remote_is_fetch_error() {
        let loader = AutoLoader::new()
            .with_remote_url("http://127.0.0.1:1/gov.json")
            .with_timeout(Duration::from_secs(2));

        match loader.load() {
            Err(RegistryError::FetchError { url, source, .. }) => {
                assert_eq!(url, "http://127.0.0.1:1/gov.json");
                assert!(source.is_some());
            }
            other => panic!("expected FetchError, got {:?}", other),
        }
    }
}
