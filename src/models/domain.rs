use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provider verification state as stored by the provider directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(format!("unknown verification status: {}", other)),
        }
    }
}

/// Aggregated review signal for a provider
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub average: f64,
    #[serde(rename = "totalReviews", default)]
    pub total_reviews: u32,
}

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates are finite numbers
    pub fn is_usable(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Where a provider is based. Each coordinate may be missing independently.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderLocation {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: String,
}

impl ProviderLocation {
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)).filter(GeoPoint::is_usable),
            _ => None,
        }
    }
}

/// Service provider snapshot record, read-only for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(rename = "verificationStatus", default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(rename = "experienceYears", default)]
    pub experience_years: Option<f64>,
    #[serde(default)]
    pub location: Option<ProviderLocation>,
}

impl Provider {
    pub fn verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    pub fn has_skill(&self, category: &str) -> bool {
        self.skills.iter().any(|s| s == category)
    }

    /// Review count, zero when the provider has no rating yet
    pub fn total_reviews(&self) -> u32 {
        self.rating.map(|r| r.total_reviews).unwrap_or(0)
    }

    /// Observed average; a rating without reviews carries no signal
    pub fn average_rating(&self) -> f64 {
        match self.rating {
            Some(r) if r.total_reviews > 0 && r.average.is_finite() => r.average,
            _ => 0.0,
        }
    }

    pub fn experience(&self) -> f64 {
        self.experience_years
            .filter(|y| y.is_finite() && *y > 0.0)
            .unwrap_or(0.0)
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(ProviderLocation::coordinates)
    }
}

/// Breakdown of a provider's score against one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub score: f64,
    #[serde(rename = "bayesianAverage")]
    pub bayesian_average: f64,
    #[serde(rename = "trustFactor")]
    pub trust_factor: f64,
    #[serde(rename = "experienceFactor")]
    pub experience_factor: f64,
    #[serde(rename = "distanceFactor")]
    pub distance_factor: f64,
    pub distance: Option<f64>,
}

/// Single-category match entry: the provider annotated with its score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProvider {
    #[serde(flatten)]
    pub provider: Provider,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    pub distance: Option<f64>,
    #[serde(rename = "distanceFactor")]
    pub distance_factor: f64,
}

/// One member of a multi-category team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub provider: Provider,
    #[serde(rename = "coveredCategories")]
    pub covered_categories: Vec<String>,
    #[serde(flatten)]
    pub score: ScoreResult,
}
