use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::core::combination::MAX_CATEGORIES;
use crate::models::domain::GeoPoint;

/// Semantic checks the derive-based validation can't express
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("Service type must not be blank")]
    BlankCategory,

    #[error("Service location coordinates must be finite numbers")]
    InvalidLocation,

    #[error("At most {max} distinct service types can be matched at once, got {got}")]
    TooManyCategories { max: usize, got: usize },
}

/// Request to rank providers for one service type
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "service_type", rename = "serviceType")]
    pub service_type: String,
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(alias = "service_location", rename = "serviceLocation", default)]
    pub service_location: Option<GeoPoint>,
}

impl ServiceMatchRequest {
    pub fn check(&self) -> Result<(), RequestError> {
        if self.service_type.trim().is_empty() {
            return Err(RequestError::BlankCategory);
        }
        check_location(self.service_location.as_ref())
    }
}

/// Request to assemble a team covering several service types
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MultiServiceMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "service_types", rename = "serviceTypes")]
    pub service_types: Vec<String>,
    #[validate(range(min = 1))]
    #[serde(alias = "max_providers", rename = "maxProviders", default)]
    pub max_providers: Option<u16>,
    #[serde(alias = "service_location", rename = "serviceLocation", default)]
    pub service_location: Option<GeoPoint>,
}

impl MultiServiceMatchRequest {
    pub fn check(&self) -> Result<(), RequestError> {
        if self.service_types.iter().any(|s| s.trim().is_empty()) {
            return Err(RequestError::BlankCategory);
        }

        let mut distinct: Vec<&str> = self.service_types.iter().map(String::as_str).collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() > MAX_CATEGORIES {
            return Err(RequestError::TooManyCategories {
                max: MAX_CATEGORIES,
                got: distinct.len(),
            });
        }

        check_location(self.service_location.as_ref())
    }
}

/// Request to check whether a provider can be requested for a service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckProviderRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "provider_id", rename = "providerId")]
    pub provider_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "service_type", rename = "serviceType")]
    pub service_type: String,
}

fn check_location(location: Option<&GeoPoint>) -> Result<(), RequestError> {
    match location {
        Some(point) if !point.is_usable() => Err(RequestError::InvalidLocation),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_service_types_rejected() {
        let req: MultiServiceMatchRequest = serde_json::from_str(r#"{"serviceTypes": []}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_zero_team_size_rejected() {
        let req: MultiServiceMatchRequest =
            serde_json::from_str(r#"{"serviceTypes": ["Plumbing"], "maxProviders": 0}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_category_rejected() {
        let req: ServiceMatchRequest = serde_json::from_str(r#"{"serviceType": "   "}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.check(), Err(RequestError::BlankCategory));
    }

    #[test]
    fn test_too_many_categories_rejected() {
        let req = MultiServiceMatchRequest {
            service_types: (0..=MAX_CATEGORIES).map(|i| format!("skill-{}", i)).collect(),
            max_providers: Some(3),
            service_location: None,
        };
        assert!(matches!(req.check(), Err(RequestError::TooManyCategories { .. })));
    }

    #[test]
    fn test_duplicate_categories_count_once() {
        let req = MultiServiceMatchRequest {
            service_types: vec!["Plumbing".to_string(); MAX_CATEGORIES + 5],
            max_providers: None,
            service_location: None,
        };
        assert_eq!(req.check(), Ok(()));
    }

    #[test]
    fn test_location_and_snake_case_aliases() {
        let req: ServiceMatchRequest = serde_json::from_str(
            r#"{"service_type": "Tiling", "limit": 5, "service_location": {"latitude": 27.7, "longitude": 85.3}}"#,
        )
        .unwrap();
        assert_eq!(req.limit, Some(5));
        assert!(req.check().is_ok());
    }
}
