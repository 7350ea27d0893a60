use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{filters::is_eligible, Matcher};
use crate::models::{
    CheckProviderRequest, CheckProviderResponse, ErrorResponse, HealthResponse, MultiServiceMatchRequest,
    MultiServiceMatchResponse, ServiceMatchRequest, ServiceMatchResponse,
};
use crate::services::ProviderDirectory;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<ProviderDirectory>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match/service", web::post().to(match_service))
        .route("/match/multiple-services", web::post().to(match_multiple_services))
        .route("/match/check-provider", web::post().to(check_provider));
}

fn error_response(status: StatusCode, error: &str, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status.as_u16(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.directory.health_check().await { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank providers for one service type
///
/// POST /api/v1/match/service
///
/// Request body:
/// ```json
/// {
///   "serviceType": "Plumbing",
///   "limit": 10,
///   "serviceLocation": { "latitude": 27.7172, "longitude": 85.3240 }
/// }
/// ```
async fn match_service(
    state: web::Data<AppState>,
    req: web::Json<ServiceMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match_service request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }
    if let Err(e) = req.check() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", e.to_string());
    }

    let limit = state.matching.resolve_limit(req.limit);
    let request_id = uuid::Uuid::new_v4();

    tracing::info!(%request_id, "Matching providers for {}, limit: {}", req.service_type, limit);

    let providers = match state.directory.verified_providers().await {
        Ok(providers) => providers,
        Err(e) => {
            tracing::error!(%request_id, "Failed to load providers: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load providers", e.to_string());
        }
    };

    let result = state.matcher.match_providers(
        &req.service_type,
        &providers,
        limit,
        req.service_location.as_ref(),
    );

    tracing::info!(
        %request_id,
        "Returning {} providers for {} (from {} candidates)",
        result.matches.len(),
        req.service_type,
        result.total_candidates
    );

    HttpResponse::Ok().json(ServiceMatchResponse {
        service_type: req.service_type.clone(),
        count: result.matches.len(),
        providers: result.matches,
    })
}

/// Assemble a team covering several service types
///
/// POST /api/v1/match/multiple-services
///
/// Request body:
/// ```json
/// {
///   "serviceTypes": ["Plumbing", "Tiling"],
///   "maxProviders": 3,
///   "serviceLocation": { "latitude": 27.7172, "longitude": 85.3240 }
/// }
/// ```
async fn match_multiple_services(
    state: web::Data<AppState>,
    req: web::Json<MultiServiceMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match_multiple_services request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }
    if let Err(e) = req.check() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", e.to_string());
    }

    let max_team_size = state.matching.resolve_team_size(req.max_providers);
    let request_id = uuid::Uuid::new_v4();

    tracing::info!(
        %request_id,
        "Finding team for {:?}, max providers: {}",
        req.service_types,
        max_team_size
    );

    let providers = match state.directory.verified_providers().await {
        Ok(providers) => providers,
        Err(e) => {
            tracing::error!(%request_id, "Failed to load providers: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load providers", e.to_string());
        }
    };

    // The search is CPU-bound; keep it off the async workers
    let matcher = state.matcher.clone();
    let categories = req.service_types.clone();
    let service_location = req.service_location;
    let search = web::block(move || {
        matcher.find_best_combination(&categories, &providers, max_team_size, service_location.as_ref())
    })
    .await;

    let result = match search {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(%request_id, "Combination search failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Combination search failed", e.to_string());
        }
    };

    tracing::info!(
        %request_id,
        "Returning team of {} ({}, {} states explored, uncovered: {:?})",
        result.members.len(),
        result.strategy.as_str(),
        result.nodes_explored,
        result.uncovered
    );

    HttpResponse::Ok().json(MultiServiceMatchResponse {
        service_types: req.service_types.clone(),
        count: result.members.len(),
        aggregate_score: result.aggregate_score,
        uncovered_service_types: result.uncovered,
        strategy: result.strategy.as_str().to_string(),
        providers: result.members,
    })
}

/// Check whether a provider can be requested for a service type
///
/// POST /api/v1/match/check-provider
///
/// Request body:
/// ```json
/// {
///   "providerId": "string",
///   "serviceType": "Plumbing"
/// }
/// ```
async fn check_provider(
    state: web::Data<AppState>,
    req: web::Json<CheckProviderRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let provider = match state.directory.find_provider(&req.provider_id).await {
        Ok(Some(provider)) => provider,
        Ok(None) => {
            return error_response(StatusCode::NOT_FOUND, "Provider not found", format!("No provider {}", req.provider_id));
        }
        Err(e) => {
            tracing::error!("Failed to load provider {}: {}", req.provider_id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load provider", e.to_string());
        }
    };

    let reason = if !is_eligible(&provider) {
        Some(format!("Provider is {}", provider.verification_status))
    } else if !provider.has_skill(&req.service_type) {
        Some("Provider does not offer this service type".to_string())
    } else {
        None
    };

    HttpResponse::Ok().json(CheckProviderResponse {
        provider_id: req.provider_id.clone(),
        service_type: req.service_type.clone(),
        eligible: reason.is_none(),
        reason,
    })
}
