use std::sync::Arc;

use crate::error::{RegistryError, Result};

/// Raw dataset bytes and where they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    pub bytes: Vec<u8>,
    /// e.g. `file:///srv/gov.json` or the remote URL
    pub origin: String,
}

impl RawPayload {
    pub fn new(bytes: impl Into<Vec<u8>>, origin: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            origin: origin.into(),
        }
    }
}

/// Trait for loading the domain dataset
pub trait DatasetLoader: Send + Sync {
    /// Produce the current dataset bytes.
    ///
    /// Called once per reload attempt, never concurrently by the registry.
    fn load(&self) -> Result<RawPayload>;
}

impl<T: DatasetLoader + ?Sized> DatasetLoader for Arc<T> {
    fn load(&self) -> Result<RawPayload> {
        (**self).load()
    }
}

impl<T: DatasetLoader + ?Sized> DatasetLoader for Box<T> {
    fn load(&self) -> Result<RawPayload> {
        (**self).load()
    }
}

/// Loader with no source at all
pub struct NilLoader;

impl DatasetLoader for NilLoader {
    fn load(&self) -> Result<RawPayload> {
        Err(RegistryError::SourceUnavailable { path: None })
    }
}

/// In-memory loader serving fixed bytes
pub struct MemoryLoader {
    payload: RawPayload,
}

impl MemoryLoader {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_origin(bytes, "memory")
    }

    pub fn with_origin(bytes: impl Into<Vec<u8>>, origin: impl Into<String>) -> Self {
        Self {
            payload: RawPayload::new(bytes, origin),
        }
    }
}

impl DatasetLoader for MemoryLoader {
    fn load(&self) -> Result<RawPayload> {
        Ok(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_loader() {
        let loader = MemoryLoader::new(r#"{"data": []}"#);
        let payload = loader.load().unwrap();
        assert_eq!(payload.origin, "memory");
        assert_eq!(payload.bytes, br#"{"data": []}"#.to_vec());

        // Repeated loads serve the same bytes
        assert_eq!(loader.load().unwrap(), payload);
    }

    #[test]
    fn test_nil_loader() {
        let loader = NilLoader;
        assert!(matches!(
            loader.load(),
            Err(RegistryError::SourceUnavailable { path: None })
        ));
    }

    #[test]
    fn test_shared_loader_delegates() {
        let loader: Arc<dyn DatasetLoader> =
            Arc::new(MemoryLoader::with_origin("{}", "inline"));
        let boxed: Box<dyn DatasetLoader> = Box::new(Arc::clone(&loader));
        assert_eq!(boxed.load().unwrap().origin, "inline");
    }
}
