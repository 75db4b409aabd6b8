use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for [`QueryParams`]
pub const DEFAULT_PAGE_LIMIT: i64 = 250;

/// Domain category
///
/// Closed set: every normalized domain classifies into exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The apex government domain itself
    Root,
    /// Ministries, central offices and national services
    CentralAdministration,
    /// Territorial units and local government
    LocalAdministration,
    /// Information services and campaigns
    Campaign,
    /// Everything else
    Specialized,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 5] = [
        Category::Root,
        Category::CentralAdministration,
        Category::LocalAdministration,
        Category::Campaign,
        Category::Specialized,
    ];

    /// Machine-readable slug, as used in serialized output
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Root => "root",
            Category::CentralAdministration => "central_administration",
            Category::LocalAdministration => "local_administration",
            Category::Campaign => "campaign",
            Category::Specialized => "specialized",
        }
    }

    /// Presentation label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Root => "Portal główny gov.pl",
            Category::CentralAdministration => "Administracja centralna",
            Category::LocalAdministration => "Administracja terenowa i samorząd",
            Category::Campaign => "Serwisy i kampanie informacyjne",
            Category::Specialized => "Inne / wyspecjalizowane",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when a string names no known category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts either the slug or the presentation label, case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == wanted || c.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One verified domain entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainRecord {
    /// Canonical lowercase ASCII hostname, unique key
    pub domain: String,
    /// Original label text for presentation
    pub display_name: String,
    pub category: Category,
    /// Upstream timestamp, as supplied
    pub last_seen_at: Option<String>,
    /// Provenance URL
    pub source_link: Option<String>,
}

/// Cache state exposed to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheInfo {
    pub last_refreshed: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub ttl_seconds: u64,
    pub entries_cached: usize,
    /// Message of the most recent failed reload, cleared by the next success
    pub last_error: Option<String>,
}

/// Provenance of the snapshot that answered a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub origin: Option<String>,
    pub declared_count: Option<u64>,
    pub data_timestamp: Option<String>,
}

/// Result of [`DomainRegistry::verify`](crate::DomainRegistry::verify)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// Hostname as supplied by the caller
    pub hostname: String,
    pub normalized_hostname: String,
    /// Normalized hostname is the apex or ends with the government suffix
    pub is_gov_domain: bool,
    pub is_listed: bool,
    pub matched_domain: Option<String>,
    pub display_name: Option<String>,
    pub category: Option<Category>,
    pub last_seen_at: Option<String>,
    pub source_link: Option<String>,
    /// 1.0 exact, 0.85 ancestor match, 0.0 unmatched
    pub confidence: f64,
    pub message: String,
    pub advice: Vec<String>,
    pub cache: CacheInfo,
    pub source: SourceInfo,
}

/// Filter and pagination for [`DomainRegistry::query`](crate::DomainRegistry::query)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Case-insensitive substring over domain and display name
    pub text: Option<String>,
    pub category: Option<Category>,
    /// Negative values clamp to zero
    pub limit: i64,
    /// Negative values clamp to zero
    pub offset: i64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            text: None,
            category: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl QueryParams {
    /// Create default query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Set text filter
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set category filter
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set page size
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set page start
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<DomainRecord>,
    /// Items on this page
    pub count: usize,
    /// Items matching the filter before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    /// Every category present in the snapshot
    pub categories: Vec<Category>,
    pub cache: CacheInfo,
}
