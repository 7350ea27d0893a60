use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::{Provider, ProviderLocation, Rating, VerificationStatus};

/// Errors that can occur when reading providers from PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Invalid provider row: {0}")]
    InvalidRow(String),
}

const PROVIDER_COLUMNS: &str = r#"
    id, name, skills, verification_status,
    rating_average, rating_total_reviews, experience_years,
    latitude, longitude, address
"#;

/// Read-only PostgreSQL client over the provider directory
///
/// The directory is owned by the booking platform; this client never writes
/// to it and runs no migrations.
pub struct ProviderStore {
    pool: PgPool,
}

impl ProviderStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to provider directory");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Load the snapshot of verified providers
    ///
    /// Ordered by registration time so ranking ties resolve the same way on
    /// every request.
    pub async fn verified_providers(&self) -> Result<Vec<Provider>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM service_providers
            WHERE verification_status = 'verified'
            ORDER BY created_at ASC, id ASC
            "#,
            PROVIDER_COLUMNS
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let providers = rows
            .iter()
            .map(provider_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} verified providers", providers.len());

        Ok(providers)
    }

    /// Look up a single provider regardless of verification state
    pub async fn find_provider(&self, provider_id: &str) -> Result<Option<Provider>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM service_providers
            WHERE id = $1
            "#,
            PROVIDER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(provider_from_row).transpose()
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn provider_from_row(row: &PgRow) -> Result<Provider, StoreError> {
    let id: String = row.try_get("id")?;

    let status: String = row.try_get("verification_status")?;
    let verification_status = status
        .parse::<VerificationStatus>()
        .map_err(|e| StoreError::InvalidRow(format!("provider {}: {}", id, e)))?;

    let rating_average: Option<f64> = row.try_get("rating_average")?;
    let total_reviews: Option<i32> = row.try_get("rating_total_reviews")?;
    let rating = match (rating_average, total_reviews) {
        (None, None) => None,
        (average, reviews) => Some(Rating {
            average: average.unwrap_or(0.0),
            total_reviews: reviews.unwrap_or(0).max(0) as u32,
        }),
    };

    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;
    let address: Option<String> = row.try_get("address")?;
    let location = match (latitude, longitude, address) {
        (None, None, None) => None,
        (latitude, longitude, address) => Some(ProviderLocation {
            latitude,
            longitude,
            address: address.unwrap_or_default(),
        }),
    };

    Ok(Provider {
        name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
        skills: row.try_get::<Option<Vec<String>>, _>("skills")?.unwrap_or_default(),
        verification_status,
        rating,
        experience_years: row.try_get("experience_years")?,
        location,
        id,
    })
}
