use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::source::{Dataset, RawPayload};
use crate::types::{Category, DomainRecord, SourceInfo};

use super::classify::Vocabulary;
use super::hostname::{candidate_domains, normalize_hostname};

/// Default size of the per-snapshot ancestor lookup cache
pub const DEFAULT_LOOKUP_CACHE_SIZE: usize = 1024;

/// Provenance and timing of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Record count declared by the source, not the indexed count
    pub declared_count: Option<u64>,
    pub data_timestamp: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub origin: String,
}

/// Immutable, fully indexed view of one successful load
pub struct Snapshot {
    records: Vec<DomainRecord>,
    index: HashMap<String, usize>,
    categories: Vec<Category>,
    apex: String,
    meta: SnapshotMeta,
    built: Instant,
    // Normalized hostname -> index of the most specific listed ancestor
    lookup_cache: Option<Mutex<LruCache<String, Option<usize>>>>,
}

impl Snapshot {
    /// Parse, normalize, classify and index a payload.
    ///
    /// Fails with [`RegistryError::EmptyDataset`] when no row yields a domain.
    pub fn build(payload: &RawPayload, vocabulary: &Vocabulary) -> Result<Self> {
        let dataset = Dataset::parse(&payload.bytes)?;

        // Later rows win on duplicate domains
        let mut by_domain: BTreeMap<String, DomainRecord> = BTreeMap::new();
        let mut skipped = 0usize;

        for row in dataset.rows() {
            let Some(raw) = row.raw_domain() else {
                skipped += 1;
                continue;
            };
            let Some(domain) = normalize_hostname(&raw) else {
                skipped += 1;
                continue;
            };

            let record = DomainRecord {
                category: vocabulary.infer_category(&domain),
                domain: domain.clone(),
                display_name: raw,
                last_seen_at: row.updated_at(),
                source_link: row.self_link().map(str::to_string),
            };
            by_domain.insert(domain, record);
        }

        if by_domain.is_empty() {
            return Err(RegistryError::EmptyDataset);
        }

        if skipped > 0 {
            debug!(skipped, rows = dataset.row_count(), "skipped dataset rows without a usable domain");
        }

        if !by_domain.contains_key(&vocabulary.apex) {
            by_domain.insert(
                vocabulary.apex.clone(),
                DomainRecord {
                    domain: vocabulary.apex.clone(),
                    display_name: vocabulary.apex.clone(),
                    category: Category::Root,
                    last_seen_at: dataset.data_timestamp(),
                    source_link: dataset.self_link().map(str::to_string),
                },
            );
        }

        // BTreeMap iteration yields records sorted by domain
        let records: Vec<DomainRecord> = by_domain.into_values().collect();
        let index = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.domain.clone(), i))
            .collect();
        let categories = records
            .iter()
            .map(|record| record.category)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(Self {
            records,
            index,
            categories,
            apex: vocabulary.apex.clone(),
            meta: SnapshotMeta {
                declared_count: dataset.declared_count(),
                data_timestamp: dataset.data_timestamp(),
                loaded_at: Utc::now(),
                origin: payload.origin.clone(),
            },
            built: Instant::now(),
            lookup_cache: None,
        })
    }

    /// Enable the ancestor lookup cache; 0 disables it
    pub fn with_lookup_cache(mut self, size: usize) -> Self {
        self.lookup_cache = NonZeroUsize::new(size).map(|size| Mutex::new(LruCache::new(size)));
        self
    }

    /// Records sorted by domain
    pub fn records(&self) -> &[DomainRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact lookup by normalized domain
    pub fn get(&self, domain: &str) -> Option<&DomainRecord> {
        self.index.get(domain).map(|&i| &self.records[i])
    }

    /// Categories present, in category order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn apex(&self) -> &str {
        &self.apex
    }

    pub fn meta(&self) -> &SnapshotMeta {
        &self.meta
    }

    /// Time since this snapshot was built
    pub fn age(&self) -> Duration {
        self.built.elapsed()
    }

    pub fn source_info(&self) -> SourceInfo {
        SourceInfo {
            origin: Some(self.meta.origin.clone()),
            declared_count: self.meta.declared_count,
            data_timestamp: self.meta.data_timestamp.clone(),
        }
    }

    /// Most specific listed ancestor of a normalized hostname, itself included
    pub fn find_listed_ancestor(&self, host: &str) -> Option<&DomainRecord> {
        let Some(cache) = &self.lookup_cache else {
            return self.walk_ancestors(host).map(|i| &self.records[i]);
        };

        // Readers never wait on each other: a busy cache is bypassed
        let Some(mut cache) = cache.try_lock() else {
            return self.walk_ancestors(host).map(|i| &self.records[i]);
        };
        if let Some(&cached) = cache.get(host) {
            return cached.map(|i| &self.records[i]);
        }

        let found = self.walk_ancestors(host);
        cache.put(host.to_string(), found);
        found.map(|i| &self.records[i])
    }

    fn walk_ancestors(&self, host: &str) -> Option<usize> {
        candidate_domains(host, &self.apex).find_map(|candidate| self.index.get(candidate).copied())
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("records", &self.records.len())
            .field("categories", &self.categories)
            .field("apex", &self.apex)
            .field("meta", &self.meta)
            .finish()
    }
}
