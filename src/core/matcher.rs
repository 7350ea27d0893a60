use std::cmp::Ordering;

use crate::core::{
    combination::{CombinationResult, CombinationSearch, DEFAULT_NODE_BUDGET},
    filters::offers_category,
    scoring::score_provider,
};
use crate::models::{GeoPoint, Provider, ScoreResult, ScoredProvider};

/// Default number of providers returned for a single service type
pub const DEFAULT_LIMIT: usize = 10;

/// Result of the single-category matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredProvider>,
    pub total_candidates: usize,
}

/// Matching orchestrator over a provider snapshot
///
/// # Operations
/// 1. `match_providers` - rank verified providers offering one service type
/// 2. `find_best_combination` - assemble a team covering several service types
///
/// Holds no per-request state; one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct Matcher {
    node_budget: usize,
}

impl Matcher {
    pub fn new(node_budget: usize) -> Self {
        Self { node_budget }
    }

    pub fn with_default_budget() -> Self {
        Self {
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }

    pub fn node_budget(&self) -> usize {
        self.node_budget
    }

    /// Rank providers for a single service type
    ///
    /// # Arguments
    /// * `category` - The requested service type
    /// * `providers` - Provider snapshot, in directory order
    /// * `limit` - Maximum number of providers to return
    /// * `service_location` - Optional location the service is needed at
    ///
    /// # Returns
    /// MatchResult with providers sorted best first. An empty snapshot or
    /// a service type nobody offers yields no matches.
    pub fn match_providers(
        &self,
        category: &str,
        providers: &[Provider],
        limit: usize,
        service_location: Option<&GeoPoint>,
    ) -> MatchResult {
        let total_candidates = providers.len();

        let mut scored: Vec<(&Provider, ScoreResult)> = providers
            .iter()
            // Stage 1: verified providers offering the service type
            .filter(|provider| offers_category(provider, category))
            // Stage 2: score against the request
            .map(|provider| (provider, score_provider(provider, service_location)))
            .collect();

        // Stage 3: rank and cut
        scored.sort_by(|a, b| compare_scores(&a.1, &b.1));
        scored.truncate(limit);

        let matches = scored
            .into_iter()
            .map(|(provider, score)| ScoredProvider {
                provider: provider.clone(),
                match_score: score.score,
                distance: score.distance,
                distance_factor: score.distance_factor,
            })
            .collect();

        MatchResult {
            matches,
            total_candidates,
        }
    }

    /// Find the best team of at most `max_team_size` providers covering `categories`
    ///
    /// See [`CombinationSearch`] for the search and its fallback.
    pub fn find_best_combination(
        &self,
        categories: &[String],
        providers: &[Provider],
        max_team_size: usize,
        service_location: Option<&GeoPoint>,
    ) -> CombinationResult {
        CombinationSearch::new(categories, providers, max_team_size, service_location)
            .with_node_budget(self.node_budget)
            .run()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_budget()
    }
}

/// Ranking order: score descending, then distance ascending with unknown
/// distances last. Equal entries keep snapshot order under a stable sort.
pub fn compare_scores(a: &ScoreResult, b: &ScoreResult) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| match (a.distance, b.distance) {
            (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
