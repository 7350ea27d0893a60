use moka::future::Cache;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::Provider;

/// Redis key holding the verified provider snapshot
pub const VERIFIED_SNAPSHOT_KEY: &str = "providers:verified";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Snapshot encoding error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Cached copy of the verified provider snapshot
///
/// The in-process tier holds the decoded snapshot so a hit costs a reference
/// count bump. The optional Redis tier shares one snapshot across instances.
/// Both tiers expire after `ttl`. Single-provider lookups are never cached.
pub struct SnapshotCache {
    local: Cache<&'static str, Arc<Vec<Provider>>>,
    redis: Option<Mutex<ConnectionManager>>,
    ttl: Duration,
}

impl SnapshotCache {
    /// In-process tier only
    pub fn in_process(ttl: Duration) -> Self {
        Self {
            local: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            redis: None,
            ttl,
        }
    }

    /// In-process tier backed by Redis
    pub async fn with_redis(redis_url: &str, ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Mutex::new(conn)),
            ..Self::in_process(ttl)
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn shared(&self) -> bool {
        self.redis.is_some()
    }

    /// Cached verified snapshot, if either tier still holds one
    pub async fn verified(&self) -> Result<Option<Arc<Vec<Provider>>>, CacheError> {
        if let Some(snapshot) = self.local.get(VERIFIED_SNAPSHOT_KEY).await {
            tracing::trace!("Snapshot served in-process ({} providers)", snapshot.len());
            return Ok(Some(snapshot));
        }

        let Some(redis) = &self.redis else {
            return Ok(None);
        };

        let encoded: Option<String> = redis::cmd("GET")
            .arg(VERIFIED_SNAPSHOT_KEY)
            .query_async(&mut *redis.lock().await)
            .await?;

        let Some(encoded) = encoded else {
            tracing::trace!("No snapshot cached");
            return Ok(None);
        };

        let snapshot = Arc::new(serde_json::from_str::<Vec<Provider>>(&encoded)?);
        tracing::trace!("Snapshot served from Redis ({} providers)", snapshot.len());

        // The local copy starts a fresh TTL, so a shared snapshot is at most
        // two TTLs old.
        self.local.insert(VERIFIED_SNAPSHOT_KEY, Arc::clone(&snapshot)).await;
        Ok(Some(snapshot))
    }

    /// Store a freshly loaded snapshot in both tiers
    pub async fn store_verified(&self, snapshot: Arc<Vec<Provider>>) -> Result<(), CacheError> {
        if let Some(redis) = &self.redis {
            let encoded = serde_json::to_string(snapshot.as_slice())?;
            redis::cmd("SETEX")
                .arg(VERIFIED_SNAPSHOT_KEY)
                .arg(self.ttl.as_secs().max(1))
                .arg(encoded)
                .query_async::<()>(&mut *redis.lock().await)
                .await?;
        }

        tracing::trace!("Cached snapshot of {} providers", snapshot.len());
        self.local.insert(VERIFIED_SNAPSHOT_KEY, snapshot).await;
        Ok(())
    }

    /// Drop the snapshot from both tiers
    pub async fn invalidate_verified(&self) -> Result<(), CacheError> {
        self.local.invalidate(VERIFIED_SNAPSHOT_KEY).await;

        if let Some(redis) = &self.redis {
            redis::cmd("DEL")
                .arg(VERIFIED_SNAPSHOT_KEY)
                .query_async::<()>(&mut *redis.lock().await)
                .await?;
        }
        Ok(())
    }
}
