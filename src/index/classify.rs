//! Domain classification.
//!
//! Classification is driven by a [`Vocabulary`]: the apex domain plus three
//! curated keyword sets. The defaults are the gov.pl product lists; a
//! deployment may load its own from JSON.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::types::Category;

use super::hostname::is_within;

/// Default apex government domain
pub const DEFAULT_APEX: &str = "gov.pl";

/// Ministries, central offices and national services
pub const CENTRAL_KEYWORDS: &[&str] = &[
    "gov", "kprm", "kancelaria", "mon", "mzb", "mswia", "mf", "mz", "nfosigw", "nfz", "zus",
    "podatki", "obywatel", "cesc", "ceidg", "govpl",
];

/// Information services, programmes and campaign years
pub const CAMPAIGN_KEYWORDS: &[&str] = &[
    "akcja",
    "kampania",
    "program",
    "projekt",
    "spis",
    "wybory",
    "bezpieczenstwo",
    "szczepimy",
    "szczepimysie",
    "gov",
    "info",
    "portal",
    "edukacja",
    "polska",
    "2020",
    "2021",
    "2022",
    "2023",
    "2024",
    "2025",
];

/// Territorial units and local government offices
pub const LOCAL_KEYWORDS: &[&str] = &[
    "um",
    "ug",
    "urzad",
    "urzadmiasta",
    "miasto",
    "gmina",
    "powiat",
    "starostwo",
    "lodzkie",
    "slaskie",
    "kujawsko",
    "lubelskie",
    "malopolska",
    "mazowsze",
    "pomorskie",
    "podlaskie",
    "podkarpackie",
    "opolskie",
    "warminsko",
    "zachodniopomorskie",
];

static STANDARD: Lazy<Vocabulary> = Lazy::new(Vocabulary::default);

/// Classification policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Apex government domain, e.g. `gov.pl`
    pub apex: String,
    pub central: HashSet<String>,
    pub campaign: HashSet<String>,
    pub local: HashSet<String>,
    /// Category for single-label prefixes that hit no keyword
    pub single_label_default: Category,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            apex: DEFAULT_APEX.to_string(),
            central: to_set(CENTRAL_KEYWORDS),
            campaign: to_set(CAMPAIGN_KEYWORDS),
            local: to_set(LOCAL_KEYWORDS),
            single_label_default: Category::CentralAdministration,
        }
    }
}

impl Vocabulary {
    /// Shared default vocabulary
    pub fn standard() -> &'static Vocabulary {
        &STANDARD
    }

    /// Load a vocabulary from a JSON file; missing fields take defaults
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            RegistryError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&bytes)
            .map_err(|e| RegistryError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse a vocabulary from JSON bytes
    pub fn from_json(bytes: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        let vocabulary: Vocabulary = serde_json::from_slice(bytes)?;
        Ok(vocabulary.normalized())
    }

    /// Lowercase and trim the apex and keywords; dots around the apex are dropped
    pub fn normalized(self) -> Self {
        let lower = |set: HashSet<String>| -> HashSet<String> {
            set.into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        };
        Self {
            apex: self.apex.trim().trim_matches('.').to_lowercase(),
            central: lower(self.central),
            campaign: lower(self.campaign),
            local: lower(self.local),
            single_label_default: self.single_label_default,
        }
    }

    /// Government suffix, e.g. `.gov.pl`
    pub fn suffix(&self) -> String {
        format!(".{}", self.apex)
    }

    /// Whether a normalized domain is the apex or under it
    pub fn is_gov_domain(&self, domain: &str) -> bool {
        is_within(domain, &self.apex)
    }

    /// Classify a normalized domain. Total: every input gets a category.
    pub fn infer_category(&self, domain: &str) -> Category {
        if domain == self.apex {
            return Category::Root;
        }

        let prefix = match domain.strip_suffix(&self.apex) {
            Some(prefix) if prefix.ends_with('.') => prefix.trim_matches('.'),
            _ => return Category::Specialized,
        };

        let labels = prefix.split('.').filter(|l| !l.is_empty()).count();
        if labels == 0 {
            return Category::Root;
        }

        let tokens = tokenize(prefix);
        let hits = |set: &HashSet<String>| tokens.iter().any(|t| set.contains(t));

        if labels == 1 {
            if hits(&self.central) {
                Category::CentralAdministration
            } else if hits(&self.campaign) {
                Category::Campaign
            } else {
                self.single_label_default
            }
        } else if hits(&self.local) {
            Category::LocalAdministration
        } else if hits(&self.campaign) {
            Category::Campaign
        } else {
            Category::Specialized
        }
    }
}

/// Classify with the standard vocabulary
pub fn infer_category(domain: &str) -> Category {
    Vocabulary::standard().infer_category(domain)
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Split a domain prefix into lowercase label/hyphen tokens
fn tokenize(prefix: &str) -> Vec<String> {
    prefix
        .split(['.', '-'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
