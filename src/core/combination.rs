use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    filters::{categories_in, coverage_mask, is_eligible},
    matcher::compare_scores,
    scoring::score_provider,
};
use crate::models::{GeoPoint, Provider, ScoreResult, TeamMember};

/// Categories are tracked as bits of a `u64`
pub const MAX_CATEGORIES: usize = u64::BITS as usize;
/// Default cap on search states visited per request
pub const DEFAULT_NODE_BUDGET: usize = 100_000;
/// Default team size when the caller doesn't ask for one
pub const DEFAULT_TEAM_SIZE: usize = 3;

/// How a combination result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Nobody offers any requested category
    NoCandidates,
    /// One category requested: plain top-K ranking
    SingleCategory,
    /// Best team found by the backtracking search
    Backtracking,
    /// Search recorded nothing; top-K relevant providers by score
    Fallback,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::NoCandidates => "no_candidates",
            SearchStrategy::SingleCategory => "single_category",
            SearchStrategy::Backtracking => "backtracking",
            SearchStrategy::Fallback => "fallback",
        }
    }
}

/// Team chosen for a multi-category request
#[derive(Debug, Clone)]
pub struct CombinationResult {
    /// Members in discovery order
    pub members: Vec<TeamMember>,
    pub aggregate_score: f64,
    /// Requested categories no member covers
    pub uncovered: Vec<String>,
    pub strategy: SearchStrategy,
    pub nodes_explored: usize,
    pub budget_exhausted: bool,
}

struct Candidate<'a> {
    provider: &'a Provider,
    score: ScoreResult,
    /// Requested categories this provider can perform
    skills: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pick {
    index: usize,
    /// Categories this member was added to cover
    covered: u64,
}

struct Best {
    team: Vec<Pick>,
    covered: u32,
    aggregate: f64,
}

/// Depth-first search for the best team covering a set of categories
///
/// Every unused provider that covers at least one still-open category is
/// tried in snapshot order. A branch finishes when every category is covered
/// or the team is full. A branch where nobody can cover what is left records
/// nothing; if no branch finishes, the top relevant providers are returned.
///
/// A finished team replaces the current best when it covers more categories,
/// or the same number with a strictly higher aggregate score, so among equal
/// teams the first one discovered wins. Teams with a member whose categories
/// are all held by teammates are skipped; the smaller team is reached on its
/// own branch.
///
/// The open categories and the team travel by value down each branch. The
/// only state shared across branches is the best team so far and the node
/// counter.
pub struct CombinationSearch<'a> {
    categories: Vec<String>,
    candidates: Vec<Candidate<'a>>,
    full_mask: u64,
    max_team_size: usize,
    node_budget: usize,
    nodes: usize,
    exhausted: bool,
    best: Option<Best>,
}

impl<'a> CombinationSearch<'a> {
    pub fn new(
        categories: &[String],
        providers: &'a [Provider],
        max_team_size: usize,
        service_location: Option<&GeoPoint>,
    ) -> Self {
        let categories = distinct_categories(categories);

        // Relevance filter: verified providers covering at least one category
        let candidates: Vec<Candidate<'a>> = providers
            .iter()
            .filter(|provider| is_eligible(provider))
            .filter_map(|provider| {
                let skills = coverage_mask(provider, &categories);
                (skills != 0).then(|| Candidate {
                    provider,
                    score: score_provider(provider, service_location),
                    skills,
                })
            })
            .collect();

        let full_mask = match categories.len() {
            MAX_CATEGORIES => u64::MAX,
            n => (1u64 << n) - 1,
        };

        Self {
            categories,
            candidates,
            full_mask,
            max_team_size,
            node_budget: DEFAULT_NODE_BUDGET,
            nodes: 0,
            exhausted: false,
            best: None,
        }
    }

    pub fn with_node_budget(mut self, node_budget: usize) -> Self {
        self.node_budget = node_budget;
        self
    }

    pub fn run(mut self) -> CombinationResult {
        if self.candidates.is_empty() || self.max_team_size == 0 {
            return self.finish(Vec::new(), SearchStrategy::NoCandidates);
        }

        if self.categories.len() == 1 {
            let team = self.top_ranked();
            return self.finish(team, SearchStrategy::SingleCategory);
        }

        self.explore(self.full_mask, Vec::with_capacity(self.max_team_size), 0.0);

        if self.exhausted {
            warn!(
                "Combination search hit its budget of {} states ({} candidates, {} categories)",
                self.node_budget,
                self.candidates.len(),
                self.categories.len()
            );
        }

        match self.best.take() {
            Some(best) => self.finish(best.team, SearchStrategy::Backtracking),
            None => {
                debug!("Combination search recorded no team, falling back to top providers");
                let team = self.top_ranked();
                self.finish(team, SearchStrategy::Fallback)
            }
        }
    }

    fn explore(&mut self, remaining: u64, team: Vec<Pick>, aggregate: f64) {
        self.nodes += 1;

        if remaining == 0 || team.len() >= self.max_team_size {
            self.consider(team, remaining, aggregate);
            return;
        }

        for index in 0..self.candidates.len() {
            if self.nodes >= self.node_budget {
                self.exhausted = true;
                return;
            }
            if team.iter().any(|pick| pick.index == index) {
                continue;
            }

            let covered = self.candidates[index].skills & remaining;
            if covered == 0 {
                continue;
            }

            let score = self.candidates[index].score.score;
            let mut next = team.clone();
            next.push(Pick { index, covered });
            self.explore(remaining & !covered, next, aggregate + score);
        }
    }

    /// Keep a finished team if it covers more categories than the best so far,
    /// or as many with a strictly higher aggregate score. A full team that
    /// covers everything beats a higher-scoring full team that doesn't.
    fn consider(&mut self, team: Vec<Pick>, remaining: u64, aggregate: f64) {
        if team.is_empty() || !self.is_minimal(&team) {
            return;
        }

        let covered = (self.full_mask & !remaining).count_ones();
        let better = match &self.best {
            None => true,
            Some(best) => {
                covered > best.covered || (covered == best.covered && aggregate > best.aggregate)
            }
        };

        if better {
            self.best = Some(Best {
                team,
                covered,
                aggregate,
            });
        }
    }

    /// Every member covers at least one category no teammate can
    fn is_minimal(&self, team: &[Pick]) -> bool {
        team.iter().enumerate().all(|(i, pick)| {
            let teammates = team
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .fold(0u64, |mask, (_, other)| mask | self.candidates[other.index].skills);
            pick.covered & !teammates != 0
        })
    }

    /// Best `max_team_size` candidates by score, ignoring coverage
    fn top_ranked(&self) -> Vec<Pick> {
        let mut order: Vec<usize> = (0..self.candidates.len()).collect();
        order.sort_by(|&a, &b| compare_scores(&self.candidates[a].score, &self.candidates[b].score));
        order
            .into_iter()
            .take(self.max_team_size)
            .map(|index| Pick {
                index,
                covered: self.candidates[index].skills,
            })
            .collect()
    }

    fn finish(self, team: Vec<Pick>, strategy: SearchStrategy) -> CombinationResult {
        let covered = team.iter().fold(0u64, |mask, pick| mask | pick.covered);

        let members: Vec<TeamMember> = team
            .iter()
            .map(|pick| {
                let candidate = &self.candidates[pick.index];
                TeamMember {
                    provider: candidate.provider.clone(),
                    covered_categories: categories_in(pick.covered, &self.categories),
                    score: candidate.score.clone(),
                }
            })
            .collect();

        debug!(
            "Combination search ({}) explored {} states, team of {}",
            strategy.as_str(),
            self.nodes,
            members.len()
        );

        CombinationResult {
            aggregate_score: members.iter().map(|m| m.score.score).sum(),
            uncovered: categories_in(self.full_mask & !covered, &self.categories),
            members,
            strategy,
            nodes_explored: self.nodes,
            budget_exhausted: self.exhausted,
        }
    }
}

/// Requested categories without duplicates, in request order
fn distinct_categories(categories: &[String]) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        if !distinct.contains(category) {
            distinct.push(category.clone());
        }
    }

    if distinct.len() > MAX_CATEGORIES {
        warn!(
            "Ignoring {} service types beyond the first {}",
            distinct.len() - MAX_CATEGORIES,
            MAX_CATEGORIES
        );
        distinct.truncate(MAX_CATEGORIES);
    }
    distinct
}
