// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoPoint, Provider, ProviderLocation, Rating, ScoreResult, ScoredProvider, TeamMember, VerificationStatus};
pub use requests::{CheckProviderRequest, MultiServiceMatchRequest, RequestError, ServiceMatchRequest};
pub use responses::{CheckProviderResponse, ErrorResponse, HealthResponse, MultiServiceMatchResponse, ServiceMatchResponse};
