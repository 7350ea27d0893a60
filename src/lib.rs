//! Provider Match - provider ranking and team-building service
//!
//! This library ranks verified service providers for a requested service type
//! and searches for small teams that jointly cover several service types.
//! The engine in [`core`] is pure: it works over a provider snapshot handed
//! in by the caller and keeps no state between requests.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{distance::{distance_km, haversine_distance}, scoring::score_provider, CombinationResult, Matcher, SearchStrategy};
pub use crate::models::{GeoPoint, Provider, ScoreResult, ScoredProvider, TeamMember, VerificationStatus};
