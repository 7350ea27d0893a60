use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use provider_match::config::{CacheSettings, LoggingSettings, Settings};
use provider_match::core::Matcher;
use provider_match::routes::{self, matches::AppState};
use provider_match::services::{ProviderDirectory, ProviderStore, SnapshotCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// RUST_LOG wins over the configured level when set
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "compact" => subscriber.compact().init(),
        _ => subscriber.json().init(),
    }
}

/// Snapshot cache when enabled; matching works straight off PostgreSQL without one
async fn snapshot_cache(cache: &CacheSettings) -> Option<SnapshotCache> {
    if !cache.enabled {
        info!("Snapshot cache disabled, reading providers per request");
        return None;
    }

    let ttl = Duration::from_secs(cache.ttl_secs);
    let Some(redis_url) = &cache.redis_url else {
        info!("Snapshot cache in-process only (ttl {:?})", ttl);
        return Some(SnapshotCache::in_process(ttl));
    };

    match SnapshotCache::with_redis(redis_url, ttl).await {
        Ok(cache) => {
            info!("Snapshot cache shared through Redis (ttl {:?})", cache.ttl());
            Some(cache)
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), caching in-process only", e);
            Some(SnapshotCache::in_process(ttl))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging is configured from settings, so they load before the subscriber exists
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging);

    info!("Starting provider matching service...");
    info!("Configuration loaded successfully");

    let store = ProviderStore::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
    })?;

    info!(
        "Provider store initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let cache = snapshot_cache(&settings.cache).await.map(Arc::new);

    let matcher = Matcher::new(settings.matching.search_node_budget);

    info!("Matcher initialized with search budget of {} states", matcher.node_budget());

    let app_state = AppState {
        directory: Arc::new(ProviderDirectory::new(Arc::new(store), cache)),
        matcher,
        matching: settings.matching.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
