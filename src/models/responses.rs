use serde::{Deserialize, Serialize};
use crate::models::domain::{ScoredProvider, TeamMember};

/// Response for the single service match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMatchResponse {
    #[serde(rename = "serviceType")]
    pub service_type: String,
    pub providers: Vec<ScoredProvider>,
    pub count: usize,
}

/// Response for the multiple services match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiServiceMatchResponse {
    #[serde(rename = "serviceTypes")]
    pub service_types: Vec<String>,
    pub providers: Vec<TeamMember>,
    pub count: usize,
    #[serde(rename = "aggregateScore")]
    pub aggregate_score: f64,
    #[serde(rename = "uncoveredServiceTypes")]
    pub uncovered_service_types: Vec<String>,
    pub strategy: String,
}

/// Response for the provider eligibility check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckProviderResponse {
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(rename = "serviceType")]
    pub service_type: String,
    pub eligible: bool,
    pub reason: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
