//! Roomie Match - compatibility scoring for roommate matching
//!
//! This library scores how well two roommate profiles fit together and ranks
//! candidate pools for a subject. Scoring is a weighted blend of budget
//! overlap, location, mutual gender preference and lifestyle clusters, with
//! the weights re-normalised over whatever data both sides actually provided.
//! Candidates can be narrowed first with a two-stage proximity filter
//! (bounding box, then exact Haversine distance).
//!
//! Everything is pure and synchronous; a [`MatchEngine`] can be cloned and
//! shared freely across threads.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod telemetry;

// Re-export commonly used types
pub use crate::core::{
    distance::{bounding_box, haversine_distance},
    filters::{filter_by_proximity, Located},
    LocationTaxonomy, MatchEngine, MatchOptions, MatchResult,
};
pub use config::Settings;
pub use error::{MatchError, Result};
pub use models::{
    BudgetRange, CompatibilityResult, Coordinates, FactorBreakdown, Listing, Location, Nearby, Profile,
    ProfileRecord, ScoringWeights,
};

/// Score one pair of profiles
///
/// Uses the default weight table when `weights` is `None`. The table is
/// validated before any scoring happens.
pub fn score_profiles(
    subject: &Profile,
    candidate: &Profile,
    weights: Option<&ScoringWeights>,
) -> Result<CompatibilityResult> {
    let engine = match weights {
        Some(weights) => MatchEngine::new(*weights)?,
        None => MatchEngine::with_default_weights(),
    };
    engine.score(subject, candidate)
}

/// Rank `candidates` for `subject` with the default weights, keeping scores of at least `min_score`
pub fn generate_matches(subject: &Profile, candidates: &[Profile], min_score: f64) -> Result<Vec<CompatibilityResult>> {
    MatchEngine::with_default_weights().generate_matches(subject, candidates, min_score)
}

/// Points within `radius_miles` of `center`, nearest first
pub fn nearby<'a, T: Located>(center: &Coordinates, radius_miles: f64, points: &'a [T]) -> Result<Vec<Nearby<&'a T>>> {
    let hits = filter_by_proximity(center, radius_miles, points)?;
    Ok(crate::core::rank_and_truncate(hits, crate::core::SortKey::Distance, None))
}
