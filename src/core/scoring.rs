use crate::core::distance::distance_km;
use crate::models::{GeoPoint, Provider, ScoreResult};

/// Prior belief about an unknown provider's rating
pub const PRIOR_MEAN: f64 = 3.0;
/// Number of virtual reviews backing the prior
pub const PRIOR_STRENGTH: f64 = 10.0;
pub const TRUST_WEIGHT: f64 = 0.1;
pub const EXPERIENCE_WEIGHT: f64 = 0.2;
/// Years of experience at which the experience bonus saturates
pub const EXPERIENCE_CAP_YEARS: f64 = 10.0;
/// Proximity bonus radius; nothing beyond it earns a bonus
pub const DISTANCE_CAP_KM: f64 = 20.0;
/// Proximity weight when the caller supplied a service location
pub const EXPLICIT_LOCATION_WEIGHT: f64 = 0.3;
/// Proximity weight when only the city center is available as reference
pub const IMPLICIT_LOCATION_WEIGHT: f64 = 0.15;

/// Fallback reference point (Kathmandu, Thamel area)
pub const CITY_CENTER: GeoPoint = GeoPoint {
    latitude: 27.7172,
    longitude: 85.3240,
};

/// Score a provider against an optional service location
///
/// Scoring formula:
/// score = (
///     bayesian_average +      # rating shrunk toward 3.0 with 10 virtual reviews
///     trust_factor +          # ln(1 + reviews) * 0.1
///     experience_factor +     # min(years / 10, 1) * 0.2
///     distance_factor         # linear bonus inside 20km, 0.3 or 0.15 at 0km
/// )
pub fn score_provider(provider: &Provider, service_location: Option<&GeoPoint>) -> ScoreResult {
    let total_reviews = provider.total_reviews();

    let bayesian_average = bayesian_average(provider.average_rating(), total_reviews);
    let trust_factor = trust_factor(total_reviews);
    let experience_factor = experience_factor(provider.experience());

    let (distance, distance_factor) = match reference_distance(provider, service_location) {
        Some((distance, weight)) => (Some(distance), distance_factor(distance, weight)),
        None => (None, 0.0),
    };

    ScoreResult {
        provider_id: provider.id.clone(),
        score: bayesian_average + trust_factor + experience_factor + distance_factor,
        bayesian_average,
        trust_factor,
        experience_factor,
        distance_factor,
        distance,
    }
}

#[inline]
pub fn bayesian_average(average: f64, total_reviews: u32) -> f64 {
    let n = total_reviews as f64;
    (PRIOR_MEAN * PRIOR_STRENGTH + average * n) / (PRIOR_STRENGTH + n)
}

#[inline]
pub fn trust_factor(total_reviews: u32) -> f64 {
    (total_reviews as f64).ln_1p() * TRUST_WEIGHT
}

#[inline]
pub fn experience_factor(years: f64) -> f64 {
    (years / EXPERIENCE_CAP_YEARS).min(1.0) * EXPERIENCE_WEIGHT
}

/// Linear proximity bonus, zero at and beyond the cap
#[inline]
pub fn distance_factor(distance_km: f64, weight: f64) -> f64 {
    if distance_km <= DISTANCE_CAP_KM {
        ((DISTANCE_CAP_KM - distance_km) / DISTANCE_CAP_KM * weight).max(0.0)
    } else {
        0.0
    }
}

/// Pick the reference point and return `(distance_km, weight)`
///
/// Precedence:
/// 1. service location and provider location: distance between them, full weight
/// 2. service location only: distance from the service location to the city center, full weight
/// 3. provider location only: distance from the city center to the provider, reduced weight
/// 4. neither: no distance
fn reference_distance(provider: &Provider, service_location: Option<&GeoPoint>) -> Option<(f64, f64)> {
    let service_location = service_location.filter(|p| p.is_usable());

    match (service_location, provider.coordinates()) {
        (Some(service), Some(base)) => Some((distance_km(service, &base), EXPLICIT_LOCATION_WEIGHT)),
        (Some(service), None) => Some((distance_km(service, &CITY_CENTER), EXPLICIT_LOCATION_WEIGHT)),
        (None, Some(base)) => Some((distance_km(&CITY_CENTER, &base), IMPLICIT_LOCATION_WEIGHT)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProviderLocation, Rating, VerificationStatus};

    /// Degrees of latitude spanning roughly `km` kilometers
    fn km_north(km: f64) -> f64 {
        km / 111.195
    }

    fn create_test_provider(average: f64, reviews: u32, years: f64, at: Option<GeoPoint>) -> Provider {
        Provider {
            id: "provider".to_string(),
            name: "Test Provider".to_string(),
            skills: vec!["Plumbing".to_string()],
            verification_status: VerificationStatus::Verified,
            rating: Some(Rating { average, total_reviews: reviews }),
            experience_years: Some(years),
            location: at.map(|p| ProviderLocation {
                latitude: Some(p.latitude),
                longitude: Some(p.longitude),
                address: String::new(),
            }),
        }
    }

    #[test]
    fn test_zero_reviews_equals_prior() {
        for average in [0.0, 1.0, 5.0] {
            let provider = create_test_provider(average, 0, 0.0, None);
            let result = score_provider(&provider, None);
            assert_eq!(result.bayesian_average, PRIOR_MEAN);
            assert_eq!(result.trust_factor, 0.0);
        }
    }

    #[test]
    fn test_bayesian_average_shrinks_toward_prior() {
        // One 5-star review barely moves the estimate
        let single = bayesian_average(5.0, 1);
        assert!((single - 35.0 / 11.0).abs() < 1e-12);

        // Many reviews dominate the prior
        let many = bayesian_average(4.5, 1000);
        assert!(many > 4.45 && many < 4.5);
    }

    #[test]
    fn test_trust_factor_monotonic() {
        let mut previous = trust_factor(0);
        for reviews in 1..500 {
            let current = trust_factor(reviews);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_experience_saturates() {
        assert_eq!(experience_factor(10.0), experience_factor(50.0));
        assert_eq!(experience_factor(10.0), EXPERIENCE_WEIGHT);
        assert!((experience_factor(5.0) - 0.1).abs() < 1e-12);
        assert_eq!(experience_factor(0.0), 0.0);
    }

    #[test]
    fn test_distance_factor_boundaries() {
        assert_eq!(distance_factor(20.0, EXPLICIT_LOCATION_WEIGHT), 0.0);
        assert_eq!(distance_factor(25.0, EXPLICIT_LOCATION_WEIGHT), 0.0);
        assert_eq!(distance_factor(0.0, EXPLICIT_LOCATION_WEIGHT), 0.3);
        assert_eq!(distance_factor(0.0, IMPLICIT_LOCATION_WEIGHT), 0.15);
        assert!((distance_factor(10.0, EXPLICIT_LOCATION_WEIGHT) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_closer_provider_gets_larger_bonus() {
        let service = GeoPoint::new(27.70, 85.32);
        let near = create_test_provider(4.0, 10, 3.0, Some(GeoPoint::new(27.70 + km_north(2.0), 85.32)));
        let far = create_test_provider(4.0, 10, 3.0, Some(GeoPoint::new(27.70 + km_north(12.0), 85.32)));

        let near_score = score_provider(&near, Some(&service));
        let far_score = score_provider(&far, Some(&service));

        assert!(near_score.distance_factor > far_score.distance_factor);
        assert!(near_score.score > far_score.score);
    }

    #[test]
    fn test_service_location_without_provider_location_uses_city_center() {
        let provider = create_test_provider(4.0, 10, 3.0, None);

        let result = score_provider(&provider, Some(&CITY_CENTER));
        assert_eq!(result.distance, Some(0.0));
        assert_eq!(result.distance_factor, EXPLICIT_LOCATION_WEIGHT);
    }

    #[test]
    fn test_no_service_location_uses_reduced_weight() {
        let provider = create_test_provider(4.0, 10, 3.0, Some(CITY_CENTER));

        let result = score_provider(&provider, None);
        assert_eq!(result.distance, Some(0.0));
        assert_eq!(result.distance_factor, IMPLICIT_LOCATION_WEIGHT);
    }

    #[test]
    fn test_no_location_anywhere() {
        let provider = create_test_provider(4.0, 10, 3.0, None);

        let result = score_provider(&provider, None);
        assert_eq!(result.distance, None);
        assert_eq!(result.distance_factor, 0.0);
    }

    #[test]
    fn test_unusable_service_location_is_ignored() {
        let provider = create_test_provider(4.0, 10, 3.0, None);
        let broken = GeoPoint::new(f64::NAN, 85.3);

        let result = score_provider(&provider, Some(&broken));
        assert_eq!(result.distance, None);
        assert_eq!(result.distance_factor, 0.0);
    }

    #[test]
    fn test_established_provider_beats_single_review() {
        let p1 = create_test_provider(4.5, 20, 12.0, None);
        let p2 = create_test_provider(5.0, 1, 1.0, None);

        assert!(score_provider(&p1, None).score > score_provider(&p2, None).score);
    }

    #[test]
    fn test_score_is_sum_of_parts() {
        let provider = create_test_provider(4.2, 37, 6.0, Some(GeoPoint::new(27.69, 85.31)));
        let r = score_provider(&provider, Some(&GeoPoint::new(27.72, 85.33)));

        let sum = r.bayesian_average + r.trust_factor + r.experience_factor + r.distance_factor;
        assert!((r.score - sum).abs() < 1e-12);
        assert_eq!(r, score_provider(&provider, Some(&GeoPoint::new(27.72, 85.33))));
    }
}
