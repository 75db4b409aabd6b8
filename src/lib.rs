//! Gov Domain Registry - a cached registry of official gov.pl domains
//!
//! This library answers "is this hostname an official government domain, and
//! what do we know about it?" It provides:
//! - Hostname normalization (URLs, ports, IDNA)
//! - Longest-suffix matching: a listed domain covers all of its subdomains
//! - Classification into a closed set of categories
//! - Filtered, stable pagination over the dataset
//! - TTL-based reloading from a local file or a remote URL, serving the
//!   previous snapshot when a reload fails
//!
//! # Example
//!
//! ```rust
//! use gov_domain_registry::{Category, DomainRegistry, MemoryLoader, QueryParams, RegistryConfig};
//!
//! let dataset = r#"{
//!     "meta": { "count": 2 },
//!     "data": [
//!         { "attributes": { "col1": { "val": "mf.gov.pl" } } },
//!         { "attributes": { "col1": { "val": "um.warszawa.gov.pl" } } }
//!     ]
//! }"#;
//!
//! let registry = DomainRegistry::with_loader(RegistryConfig::new(), MemoryLoader::new(dataset)).unwrap();
//!
//! let result = registry.verify("https://www.mf.gov.pl/podatki").unwrap();
//! assert!(result.is_listed);
//! assert_eq!(result.matched_domain.as_deref(), Some("mf.gov.pl"));
//! assert_eq!(result.confidence, 0.85);
//!
//! let page = registry
//!     .query(&QueryParams::new().with_category(Category::LocalAdministration))
//!     .unwrap();
//! assert_eq!(page.items[0].domain, "um.warszawa.gov.pl");
//! ```
//!
//! # Dataset Sources
//!
//! | Source | Used when |
//! |--------|-----------|
//! | Local snapshot file | The file exists (always preferred) |
//! | Remote URL | No local file and a URL is configured |
//! | Previous snapshot | A reload fails after a successful load |

pub mod config;
pub mod error;
pub mod index;
pub mod registry;
pub mod source;
pub mod types;

// Re-export commonly used items
pub use config::{RegistryConfig, DEFAULT_CACHE_TTL};
pub use error::{RegistryError, Result};
pub use index::{infer_category, normalize_hostname, Snapshot, SnapshotMeta, Vocabulary};
pub use registry::{DomainRegistry, Refresh};
pub use source::{AutoLoader, DatasetLoader, MemoryLoader, NilLoader, RawPayload};
pub use types::{
    CacheInfo, Category, DomainRecord, Page, QueryParams, SourceInfo, VerificationResult,
};
