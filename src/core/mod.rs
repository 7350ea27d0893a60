// Core algorithm exports
pub mod combination;
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use combination::{CombinationResult, CombinationSearch, SearchStrategy};
pub use distance::{distance_km, haversine_distance};
pub use filters::{is_eligible, offers_category};
pub use matcher::{compare_scores, MatchResult, Matcher};
pub use scoring::score_provider;
