// Integration tests for Provider Match

use provider_match::core::{Matcher, SearchStrategy};
use provider_match::models::{
    GeoPoint, MultiServiceMatchResponse, Provider, ProviderLocation, Rating, ServiceMatchResponse,
    VerificationStatus,
};
use std::collections::HashSet;

fn create_test_provider(
    id: &str,
    skills: &[&str],
    average: f64,
    reviews: u32,
    years: f64,
    location: Option<(f64, f64)>,
) -> Provider {
    Provider {
        id: id.to_string(),
        name: format!("Provider {}", id),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        verification_status: VerificationStatus::Verified,
        rating: Some(Rating { average, total_reviews: reviews }),
        experience_years: Some(years),
        location: location.map(|(latitude, longitude)| ProviderLocation {
            latitude: Some(latitude),
            longitude: Some(longitude),
            address: String::new(),
        }),
    }
}

fn create_test_pool() -> Vec<Provider> {
    let mut pending = create_test_provider("pending", &["Plumbing", "Tiling"], 5.0, 120, 20.0, None);
    pending.verification_status = VerificationStatus::Pending;

    vec![
        create_test_provider("ram", &["Plumbing"], 4.5, 20, 12.0, Some((27.7100, 85.3200))),
        create_test_provider("sita", &["Plumbing", "Tiling"], 4.7, 45, 8.0, Some((27.6900, 85.3400))),
        create_test_provider("hari", &["Tiling"], 4.2, 15, 6.0, Some((27.7300, 85.3000))),
        create_test_provider("gita", &["Electrical"], 4.9, 60, 15.0, None),
        create_test_provider("newbie", &["Plumbing"], 5.0, 1, 1.0, Some((27.7172, 85.3240))),
        create_test_provider("far", &["Plumbing", "Painting"], 4.4, 30, 9.0, Some((28.2096, 83.9856))),
        pending,
    ]
}

fn categories(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_integration_single_service_matching() {
    let matcher = Matcher::default();
    let pool = create_test_pool();
    let service = GeoPoint::new(27.7050, 85.3300);

    let result = matcher.match_providers("Plumbing", &pool, 10, Some(&service));

    assert_eq!(result.total_candidates, pool.len());

    let ids: Vec<&str> = result.matches.iter().map(|m| m.provider.id.as_str()).collect();
    assert!(!ids.contains(&"pending"), "Unverified providers must not be matched");
    assert!(!ids.contains(&"hari"), "Providers without the skill must not be matched");
    assert_eq!(ids.len(), 4);

    for m in &result.matches {
        assert!(m.provider.skills.iter().any(|s| s == "Plumbing"));
    }

    for pair in result.matches.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score, "Matches not sorted by score");
    }

    // Pokhara is far beyond the bonus radius
    let far = result.matches.iter().find(|m| m.provider.id == "far").unwrap();
    assert_eq!(far.distance_factor, 0.0);
    assert!(far.distance.unwrap() > 100.0);
}

#[test]
fn test_integration_established_provider_ranks_above_newcomer() {
    let matcher = Matcher::default();
    let pool = vec![
        create_test_provider("p2", &["Plumbing"], 5.0, 1, 1.0, None),
        create_test_provider("p1", &["Plumbing"], 4.5, 20, 12.0, None),
    ];

    let result = matcher.match_providers("Plumbing", &pool, 10, None);

    assert_eq!(result.matches[0].provider.id, "p1");
    assert!(result.matches[0].match_score > result.matches[1].match_score);
}

#[test]
fn test_integration_limit_and_empty_pools() {
    let matcher = Matcher::default();
    let pool = create_test_pool();

    assert!(matcher.match_providers("Plumbing", &pool, 2, None).matches.len() <= 2);
    assert!(matcher.match_providers("Roofing", &pool, 10, None).matches.is_empty());
    assert!(matcher.match_providers("Plumbing", &[], 10, None).matches.is_empty());
    assert!(matcher.match_providers("Plumbing", &pool, 0, None).matches.is_empty());
}

#[test]
fn test_integration_plumbing_and_tiling_team() {
    let matcher = Matcher::default();
    let pool = vec![
        create_test_provider("A", &["Plumbing"], 4.3, 18, 7.0, None),
        create_test_provider("B", &["Tiling"], 4.1, 9, 4.0, None),
        create_test_provider("C", &["Plumbing", "Tiling"], 4.6, 35, 11.0, None),
    ];

    let result = matcher.find_best_combination(&categories(&["Plumbing", "Tiling"]), &pool, 2, None);

    let ids: Vec<&str> = result.members.iter().map(|m| m.provider.id.as_str()).collect();
    assert!(ids == vec!["C"] || ids == vec!["A", "B"], "Unexpected team {:?}", ids);
    assert!(result.uncovered.is_empty(), "A covering team of two exists");
    assert!(result.members.len() <= 2);
}

#[test]
fn test_integration_multi_service_team_properties() {
    let matcher = Matcher::default();
    let pool = create_test_pool();
    let wanted = categories(&["Plumbing", "Tiling", "Electrical", "Painting"]);

    for max_team_size in 1..=4 {
        let result = matcher.find_best_combination(&wanted, &pool, max_team_size, None);

        assert!(result.members.len() <= max_team_size);

        let unique: HashSet<&str> = result.members.iter().map(|m| m.provider.id.as_str()).collect();
        assert_eq!(unique.len(), result.members.len(), "Provider used twice");
        assert!(!unique.contains("pending"));

        let covered: HashSet<&String> = result.members.iter().flat_map(|m| m.covered_categories.iter()).collect();
        for category in &covered {
            assert!(wanted.contains(category));
        }
        assert_eq!(covered.len() + result.uncovered.len(), wanted.len());
    }

    // Four categories are coverable with three providers: far (Plumbing, Painting), hari or sita, gita
    let result = matcher.find_best_combination(&wanted, &pool, 3, None);
    assert_eq!(result.strategy, SearchStrategy::Backtracking);
    assert!(result.uncovered.is_empty());
}

#[test]
fn test_integration_multi_service_irrelevant_pool_is_empty() {
    let matcher = Matcher::default();
    let pool = create_test_pool();

    let result = matcher.find_best_combination(&categories(&["Roofing", "Welding"]), &pool, 3, None);

    assert!(result.members.is_empty());
    assert_eq!(result.strategy, SearchStrategy::NoCandidates);
}

#[test]
fn test_integration_budget_fallback_still_bounded() {
    let matcher = Matcher::new(1);
    let pool = create_test_pool();

    let result = matcher.find_best_combination(&categories(&["Plumbing", "Tiling", "Electrical"]), &pool, 2, None);

    assert_eq!(result.strategy, SearchStrategy::Fallback);
    assert!(result.budget_exhausted);
    assert_eq!(result.members.len(), 2);
}

#[test]
fn test_integration_response_json_shape() {
    let matcher = Matcher::default();
    let pool = create_test_pool();

    let single = matcher.match_providers("Tiling", &pool, 10, None);
    let response = ServiceMatchResponse {
        service_type: "Tiling".to_string(),
        count: single.matches.len(),
        providers: single.matches,
    };
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["serviceType"], "Tiling");
    assert_eq!(json["count"], 2);
    let first = &json["providers"][0];
    assert!(first["id"].is_string());
    assert!(first["matchScore"].is_number());
    assert!(first.get("distanceFactor").is_some());
    assert_eq!(first["verificationStatus"], "verified");

    let team = matcher.find_best_combination(&categories(&["Plumbing", "Electrical"]), &pool, 3, None);
    let response = MultiServiceMatchResponse {
        service_types: categories(&["Plumbing", "Electrical"]),
        count: team.members.len(),
        aggregate_score: team.aggregate_score,
        uncovered_service_types: team.uncovered,
        strategy: team.strategy.as_str().to_string(),
        providers: team.members,
    };
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["strategy"], "backtracking");
    let member = &json["providers"][0];
    assert!(member["provider"]["id"].is_string());
    assert!(member["coveredCategories"].is_array());
    assert!(member["score"].is_number());
    assert!(member["bayesianAverage"].is_number());
}

#[test]
fn test_integration_uncoverable_service_falls_back_to_top_providers() {
    let matcher = Matcher::default();
    let pool = vec![
        create_test_provider("A", &["Plumbing"], 4.0, 10, 5.0, None),
        create_test_provider("B", &["Plumbing"], 4.5, 30, 8.0, None),
    ];

    let result = matcher.find_best_combination(&categories(&["Plumbing", "Roofing"]), &pool, 3, None);

    let ids: Vec<&str> = result.members.iter().map(|m| m.provider.id.as_str()).collect();
    assert_eq!(result.strategy, SearchStrategy::Fallback);
    assert!(!result.budget_exhausted);
    assert_eq!(ids, vec!["B", "A"]);
    assert_eq!(result.uncovered, categories(&["Roofing"]));
}
