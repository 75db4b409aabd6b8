//! Registry module.
//!
//! [`DomainRegistry`] owns the current [`Snapshot`] and reloads it through a
//! [`DatasetLoader`] once it is older than the configured TTL. Readers never
//! wait for each other; a reload runs under a single mutex and only takes the
//! write lock to swap the snapshot in.

mod advice;
#[cfg(feature = "async")]
mod async_api;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::index::{normalize_hostname, Snapshot, Vocabulary};
use crate::source::DatasetLoader;
use crate::types::{CacheInfo, DomainRecord, Page, QueryParams, VerificationResult};

use advice::Verdict;

/// Outcome of [`DomainRegistry::ensure_fresh`]
#[derive(Debug)]
pub enum Refresh {
    /// The current snapshot is within its TTL; nothing was loaded
    Fresh,
    /// A new snapshot was loaded and installed
    Reloaded,
    /// Reload failed; the previous snapshot is still served
    StaleServedAfterError(RegistryError),
    /// Reload failed and there is no snapshot to fall back to
    FatalNoData(RegistryError),
}

impl Refresh {
    /// `Err` only when there is no data to serve
    pub fn into_result(self) -> Result<()> {
        match self {
            Refresh::FatalNoData(err) => Err(err),
            Refresh::Fresh | Refresh::Reloaded | Refresh::StaleServedAfterError(_) => Ok(()),
        }
    }

    /// Error of a failed reload, if any
    pub fn error(&self) -> Option<&RegistryError> {
        match self {
            Refresh::StaleServedAfterError(err) | Refresh::FatalNoData(err) => Some(err),
            Refresh::Fresh | Refresh::Reloaded => None,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    snapshot: Option<Arc<Snapshot>>,
    last_error: Option<String>,
}

/// Cached, self-refreshing registry of government domains
pub struct DomainRegistry {
    loader: Box<dyn DatasetLoader>,
    vocabulary: Vocabulary,
    cache_ttl: Duration,
    lookup_cache_size: usize,
    state: RwLock<RegistryState>,
    reload_lock: Mutex<()>,
}

impl DomainRegistry {
    /// Create a registry reading the configured file or remote URL.
    ///
    /// Blocks on the initial load and fails if it fails.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let loader = config.auto_loader();
        Self::with_loader(config, loader)
    }

    /// Create a registry with a custom loader. Blocks on the initial load.
    pub fn with_loader(config: RegistryConfig, loader: impl DatasetLoader + 'static) -> Result<Self> {
        let registry = Self {
            loader: Box::new(loader),
            vocabulary: config.vocabulary,
            cache_ttl: config.cache_ttl,
            lookup_cache_size: config.lookup_cache_size,
            state: RwLock::new(RegistryState::default()),
            reload_lock: Mutex::new(()),
        };
        registry.ensure_fresh(true).into_result()?;
        Ok(registry)
    }

    fn is_fresh(&self) -> bool {
        self.state
            .read()
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.age() < self.cache_ttl)
    }

    /// Reload the dataset if the snapshot expired, or unconditionally when forced.
    ///
    /// Concurrent callers that find the snapshot stale reload it once: the
    /// rest re-check freshness after acquiring the reload lock.
    pub fn ensure_fresh(&self, force: bool) -> Refresh {
        if !force && self.is_fresh() {
            return Refresh::Fresh;
        }

        let _reload = self.reload_lock.lock();

        // Double-check after acquiring lock
        if !force && self.is_fresh() {
            return Refresh::Fresh;
        }

        match self.load_snapshot() {
            Ok(snapshot) => {
                info!(
                    origin = %snapshot.meta().origin,
                    records = snapshot.len(),
                    "domain registry loaded"
                );
                let mut state = self.state.write();
                state.snapshot = Some(Arc::new(snapshot));
                state.last_error = None;
                Refresh::Reloaded
            }
            Err(err) => {
                let mut state = self.state.write();
                state.last_error = Some(err.to_string());
                if state.snapshot.is_some() {
                    warn!(error = %err, "domain registry reload failed, serving stale snapshot");
                    Refresh::StaleServedAfterError(err)
                } else {
                    error!(error = %err, "domain registry has no data");
                    Refresh::FatalNoData(err)
                }
            }
        }
    }

    /// Force a reload
    pub fn refresh(&self) -> Refresh {
        self.ensure_fresh(true)
    }

    fn load_snapshot(&self) -> Result<Snapshot> {
        let payload = self.loader.load()?;
        Ok(Snapshot::build(&payload, &self.vocabulary)?.with_lookup_cache(self.lookup_cache_size))
    }

    /// Current snapshot without triggering a reload
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.read().snapshot.clone()
    }

    /// Fresh-or-stale snapshot for one request
    fn current(&self) -> Result<Arc<Snapshot>> {
        self.ensure_fresh(false).into_result()?;
        self.snapshot()
            .ok_or(RegistryError::SourceUnavailable { path: None })
    }

    /// Cache freshness and the last reload error
    pub fn cache_info(&self) -> CacheInfo {
        let state = self.state.read();
        self.describe_cache(state.snapshot.as_deref(), state.last_error.clone())
    }

    fn describe_cache(&self, snapshot: Option<&Snapshot>, last_error: Option<String>) -> CacheInfo {
        let last_refreshed = snapshot.map(|s| s.meta().loaded_at);
        let expires_at = last_refreshed.and_then(|at| {
            chrono::Duration::from_std(self.cache_ttl)
                .ok()
                .and_then(|ttl| at.checked_add_signed(ttl))
        });
        CacheInfo {
            last_refreshed,
            expires_at,
            ttl_seconds: self.cache_ttl.as_secs(),
            entries_cached: snapshot.map_or(0, Snapshot::len),
            last_error,
        }
    }

    fn cache_info_for(&self, snapshot: &Snapshot) -> CacheInfo {
        let last_error = self.state.read().last_error.clone();
        self.describe_cache(Some(snapshot), last_error)
    }

    /// Verify a hostname against the registry.
    ///
    /// Rejects input that does not normalize to a hostname with
    /// [`RegistryError::InvalidHostname`].
    pub fn verify(&self, hostname: &str) -> Result<VerificationResult> {
        let normalized = normalize_hostname(hostname)
            .ok_or_else(|| RegistryError::InvalidHostname(hostname.to_string()))?;

        let snapshot = self.current()?;
        let is_gov_domain = self.vocabulary.is_gov_domain(&normalized);
        let record = snapshot.find_listed_ancestor(&normalized);

        let verdict = Verdict::new(&normalized, record.map(|r| r.domain.as_str()), is_gov_domain);
        let message = verdict.message(&normalized, &self.vocabulary.suffix(), &self.vocabulary.apex);

        Ok(VerificationResult {
            hostname: hostname.to_string(),
            is_gov_domain,
            is_listed: record.is_some(),
            matched_domain: record.map(|r| r.domain.clone()),
            display_name: record.map(|r| r.display_name.clone()),
            category: record.map(|r| r.category),
            last_seen_at: record.and_then(|r| r.last_seen_at.clone()),
            source_link: record.and_then(|r| r.source_link.clone()),
            confidence: verdict.confidence(),
            message,
            advice: verdict.advice(),
            cache: self.cache_info_for(&snapshot),
            source: snapshot.source_info(),
            normalized_hostname: normalized,
        })
    }

    /// Filtered, paginated listing of the registry
    pub fn query(&self, params: &QueryParams) -> Result<Page> {
        let snapshot = self.current()?;

        let needle = params
            .text
            .as_deref()
            .map(|text| text.trim().to_lowercase())
            .filter(|text| !text.is_empty());

        let matching: Vec<&DomainRecord> = snapshot
            .records()
            .iter()
            .filter(|record| match needle.as_deref() {
                Some(needle) => {
                    record.domain.contains(needle)
                        || record.display_name.to_lowercase().contains(needle)
                }
                None => true,
            })
            .filter(|record| params.category.map_or(true, |c| record.category == c))
            .collect();

        let total = matching.len();
        let offset = clamp_to_usize(params.offset);
        let limit = clamp_to_usize(params.limit);

        let items: Vec<DomainRecord> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(Page {
            count: items.len(),
            items,
            total,
            offset,
            limit,
            categories: snapshot.categories().to_vec(),
            cache: self.cache_info_for(&snapshot),
        })
    }
}

fn clamp_to_usize(value: i64) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}
