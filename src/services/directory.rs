use std::sync::Arc;

use crate::models::Provider;
use crate::services::cache::{CacheError, SnapshotCache};
use crate::services::store::{ProviderStore, StoreError};

/// Provider data for match requests
///
/// The verified snapshot reads through the cache when one is configured, so
/// it can lag the store by the cache TTL. Cache failures never fail a request;
/// they only cost a trip to PostgreSQL. Single-provider lookups always go to
/// the store.
pub struct ProviderDirectory {
    store: Arc<ProviderStore>,
    cache: Option<Arc<SnapshotCache>>,
}

impl ProviderDirectory {
    pub fn new(store: Arc<ProviderStore>, cache: Option<Arc<SnapshotCache>>) -> Self {
        Self { store, cache }
    }

    /// Snapshot of verified providers, taken once per request
    pub async fn verified_providers(&self) -> Result<Arc<Vec<Provider>>, StoreError> {
        let Some(cache) = &self.cache else {
            return Ok(Arc::new(self.store.verified_providers().await?));
        };

        match cache.verified().await {
            Ok(Some(snapshot)) => return Ok(snapshot),
            Ok(None) => {}
            Err(CacheError::SerializationError(e)) => {
                tracing::warn!("Dropping unreadable cached snapshot: {}", e);
                if let Err(e) = cache.invalidate_verified().await {
                    tracing::warn!("Failed to drop cached snapshot: {}", e);
                }
            }
            Err(e) => tracing::warn!("Snapshot cache read failed, reading from store: {}", e),
        }

        let snapshot = Arc::new(self.store.verified_providers().await?);
        if let Err(e) = cache.store_verified(Arc::clone(&snapshot)).await {
            tracing::warn!("Failed to cache snapshot: {}", e);
        }
        Ok(snapshot)
    }

    /// Current record of a single provider, verified or not
    pub async fn find_provider(&self, provider_id: &str) -> Result<Option<Provider>, StoreError> {
        self.store.find_provider(provider_id).await
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }
}
