//! Async wrappers for runtimes that must not block on a reload.

use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::types::{Page, QueryParams, VerificationResult};

use super::DomainRegistry;

impl DomainRegistry {
    /// [`verify`](DomainRegistry::verify) on the blocking thread pool
    pub async fn verify_async(self: Arc<Self>, hostname: String) -> Result<VerificationResult> {
        tokio::task::spawn_blocking(move || self.verify(&hostname))
            .await
            .map_err(|e| RegistryError::TaskError(e.to_string()))?
    }

    /// [`query`](DomainRegistry::query) on the blocking thread pool
    pub async fn query_async(self: Arc<Self>, params: QueryParams) -> Result<Page> {
        tokio::task::spawn_blocking(move || self.query(&params))
            .await
            .map_err(|e| RegistryError::TaskError(e.to_string()))?
    }
}
