//! Dataset indexing: hostname normalization, classification and snapshots.

pub mod classify;
pub mod hostname;
pub mod snapshot;

pub use classify::{infer_category, Vocabulary, DEFAULT_APEX};
pub use hostname::{candidate_domains, is_within, normalize_hostname};
pub use snapshot::{Snapshot, SnapshotMeta, DEFAULT_LOOKUP_CACHE_SIZE};
