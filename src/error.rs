use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying cause, kept for logging.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registry error types
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Neither a local snapshot file nor a remote URL is available
    #[error("Source unavailable: {}", describe_missing(.path))]
    SourceUnavailable { path: Option<PathBuf> },

    /// Fetching the remote dataset failed (transport, status, timeout or body read)
    #[error("Fetch error from {url}: {message}")]
    FetchError {
        url: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The payload parsed but produced no usable domain entries
    #[error("Dataset contains no domain entries")]
    EmptyDataset,

    /// The payload is not the expected container format
    #[error("Invalid dataset: {message}")]
    InvalidDataset {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Caller-supplied hostname is unusable
    #[error("Invalid hostname: {0:?}")]
    InvalidHostname(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Task error: {0}")]
    TaskError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RegistryError {
    pub(crate) fn fetch(
        url: &str,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        RegistryError::FetchError {
            url: url.to_string(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn invalid_dataset(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        RegistryError::InvalidDataset {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

fn describe_missing(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(
            "{} does not exist and no remote URL is configured",
            path.display()
        ),
        None => "no snapshot file and no remote URL configured".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
