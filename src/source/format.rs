//! Dataset container format.
//!
//! The dataset is a tabular JSON export:
//!
//! ```json
//! {
//!   "meta": { "count": 2, "headers_map": { "col1": "2024-05-01" } },
//!   "links": { "self": "https://example.org/resources/1/data" },
//!   "data": [
//!     {
//!       "attributes": { "col1": { "val": "mf.gov.pl", "repr": "mf.gov.pl" } },
//!       "meta": { "updated_at": "2024-05-01T10:00:00Z" },
//!       "links": { "self": "https://example.org/resources/1/data/1" }
//!     }
//!   ]
//! }
//! ```
//!
//! Rows are decoded one at a time so a malformed row is skipped instead of
//! failing the whole payload.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Parsed dataset container
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    data: Vec<Value>,
    meta: Option<DatasetMeta>,
    links: Option<Links>,
}

#[derive(Debug, Default, Deserialize)]
struct DatasetMeta {
    count: Option<Value>,
    headers_map: Option<HeadersMap>,
}

#[derive(Debug, Default, Deserialize)]
struct HeadersMap {
    col1: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    #[serde(rename = "self")]
    self_link: Option<String>,
}

/// One row of the dataset
#[derive(Debug, Default, Deserialize)]
pub struct DatasetRow {
    attributes: Option<RowAttributes>,
    meta: Option<RowMeta>,
    links: Option<Links>,
}

#[derive(Debug, Default, Deserialize)]
struct RowAttributes {
    col1: Option<Cell>,
}

#[derive(Debug, Default, Deserialize)]
struct Cell {
    val: Option<Value>,
    repr: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RowMeta {
    updated_at: Option<Value>,
}

impl Dataset {
    /// Parse the container from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| RegistryError::invalid_dataset(format!("not a dataset container: {}", e), e))
    }

    /// Number of raw rows, including ones that will be skipped
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Decodable rows, in source order
    pub fn rows(&self) -> impl Iterator<Item = DatasetRow> + '_ {
        self.data.iter().enumerate().filter_map(|(index, value)| {
            match DatasetRow::deserialize(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    debug!(index, error = %e, "skipping undecodable dataset row");
                    None
                }
            }
        })
    }

    /// Record count declared by the source
    pub fn declared_count(&self) -> Option<u64> {
        match self.meta.as_ref()?.count.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Source data timestamp
    pub fn data_timestamp(&self) -> Option<String> {
        let headers = self.meta.as_ref()?.headers_map.as_ref()?;
        scalar_text(headers.col1.as_ref())
    }

    /// Registry-wide provenance link
    pub fn self_link(&self) -> Option<&str> {
        self.links.as_ref()?.self_link.as_deref()
    }
}

impl DatasetRow {
    /// Raw domain text: `val`, else `repr`, trimmed and non-empty
    pub fn raw_domain(&self) -> Option<String> {
        let cell = self.attributes.as_ref()?.col1.as_ref()?;
        [cell.val.as_ref(), cell.repr.as_ref()]
            .into_iter()
            .filter_map(scalar_text)
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())
    }

    pub fn updated_at(&self) -> Option<String> {
        scalar_text(self.meta.as_ref()?.updated_at.as_ref())
    }

    pub fn self_link(&self) -> Option<&str> {
        self.links.as_ref()?.self_link.as_deref()
    }
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
