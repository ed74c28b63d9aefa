use crate::core::distance::validate_radius;
use crate::core::filters::{filter_by_proximity, rank_and_truncate, SortKey};
use crate::core::scoring::FactorAggregator;
use crate::core::taxonomy::LocationTaxonomy;
use crate::error::{MatchError, Result};
use crate::models::{CompatibilityResult, LocationScoring, Profile, ScoringWeights};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default minimum score for a candidate to count as a match
pub const DEFAULT_MIN_SCORE: f64 = 0.45;

/// Knobs for [`MatchEngine::find_matches`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchOptions {
    /// Inclusive cutoff in `[0, 1]`
    pub min_score: f64,
    /// Radius in miles for the proximity pre-filter
    ///
    /// Applies only when the subject has coordinates; candidates without
    /// coordinates are then excluded.
    pub proximity: Option<f64>,
    /// Drop results where a deal-breaker fired instead of only flagging them
    pub exclude_vetoed: bool,
    pub limit: Option<usize>,
}

impl MatchOptions {
    pub fn validate(&self) -> Result<()> {
        validate_min_score(self.min_score)?;
        if let Some(radius) = self.proximity {
            validate_radius(radius)?;
        }
        Ok(())
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            proximity: None,
            exclude_vetoed: true,
            limit: None,
        }
    }
}

fn validate_min_score(min_score: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&min_score) {
        return Err(MatchError::invalid(
            "minScore",
            format!("must be within [0, 1], got {min_score}"),
        ));
    }
    Ok(())
}

/// Result of the matching process
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matches: Vec<CompatibilityResult>,
    /// Pool size, excluding the subject itself
    pub total_candidates: usize,
    /// Dropped by the proximity pre-filter
    pub prefiltered_out: usize,
    /// Scored below the cutoff
    pub below_cutoff: usize,
    /// Dropped because a deal-breaker fired
    pub vetoed: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Validation of the subject and every candidate
/// 2. Optional proximity pre-filter (bounding box, then exact distance)
/// 3. Factor scoring with deal-breaker annotation
/// 4. Cutoff, ranking and truncation
///
/// Holds no mutable state; clones share the location taxonomy.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    aggregator: FactorAggregator,
    options: MatchOptions,
}

impl MatchEngine {
    /// Build an engine with a validated weight table
    pub fn new(weights: ScoringWeights) -> Result<Self> {
        Ok(Self {
            aggregator: FactorAggregator::new(weights, LocationScoring::default(), LocationTaxonomy::builtin())?,
            options: MatchOptions::default(),
        })
    }

    pub fn with_default_weights() -> Self {
        Self {
            aggregator: FactorAggregator::default(),
            options: MatchOptions::default(),
        }
    }

    /// Swap in a different place taxonomy
    pub fn with_taxonomy(self, taxonomy: Arc<LocationTaxonomy>) -> Self {
        Self {
            aggregator: self.aggregator.with_taxonomy(taxonomy),
            ..self
        }
    }

    pub fn with_location_scoring(self, location: LocationScoring) -> Result<Self> {
        Ok(Self {
            aggregator: self.aggregator.with_location_scoring(location)?,
            ..self
        })
    }

    /// Options used by [`MatchEngine::find_default_matches`]
    pub fn with_options(self, options: MatchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options, ..self })
    }

    pub fn weights(&self) -> &ScoringWeights {
        self.aggregator.weights()
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn taxonomy(&self) -> &Arc<LocationTaxonomy> {
        self.aggregator.taxonomy()
    }

    /// Score a single pair after validating both profiles
    pub fn score(&self, subject: &Profile, candidate: &Profile) -> Result<CompatibilityResult> {
        subject.validate()?;
        candidate.validate()?;
        Ok(self.aggregator.aggregate(subject, candidate))
    }

    /// Score every candidate and keep those at or above `min_score`
    ///
    /// The subject itself (same id) is skipped. Vetoed results are kept and
    /// flagged. Sorted by score descending, then candidate id.
    pub fn generate_matches(
        &self,
        subject: &Profile,
        pool: &[Profile],
        min_score: f64,
    ) -> Result<Vec<CompatibilityResult>> {
        let options = MatchOptions {
            min_score,
            proximity: None,
            exclude_vetoed: false,
            limit: None,
        };
        Ok(self.find_matches(subject, pool, &options)?.matches)
    }

    /// [`MatchEngine::find_matches`] with the engine's configured options
    pub fn find_default_matches(&self, subject: &Profile, pool: &[Profile]) -> Result<MatchResult> {
        self.find_matches(subject, pool, &self.options)
    }

    /// Find matches for a subject
    ///
    /// # Arguments
    /// * `subject` - The profile looking for a roommate
    /// * `pool` - Candidate profiles; may include the subject
    /// * `options` - Cutoff, proximity radius, veto handling and limit
    ///
    /// # Returns
    /// MatchResult with ranked matches and per-stage counts
    pub fn find_matches(&self, subject: &Profile, pool: &[Profile], options: &MatchOptions) -> Result<MatchResult> {
        options.validate()?;
        subject.validate()?;

        let candidates: Vec<&Profile> = pool.iter().filter(|c| c.id != subject.id).collect();
        for candidate in &candidates {
            candidate.validate()?;
        }
        let total_candidates = candidates.len();

        // Stage 1: proximity pre-filter
        let survivors: Vec<&Profile> = match (options.proximity, subject.coordinates()) {
            (Some(radius), Some(center)) => filter_by_proximity(&center, radius, &candidates)?
                .into_iter()
                .map(|hit| *hit.item)
                .collect(),
            (Some(radius), None) => {
                tracing::debug!(subject = %subject.id, radius, "subject has no coordinates; skipping proximity filter");
                candidates
            }
            (None, _) => candidates,
        };
        let prefiltered_out = total_candidates - survivors.len();

        // Stage 2: scoring
        let mut below_cutoff = 0usize;
        let mut vetoed = 0usize;
        let mut matches = Vec::with_capacity(survivors.len());

        for candidate in survivors {
            let result = self.aggregator.aggregate(subject, candidate);

            if result.score < options.min_score {
                tracing::debug!(candidate = %candidate.id, score = result.score, "below cutoff");
                below_cutoff += 1;
                continue;
            }

            if result.vetoed {
                tracing::warn!(
                    subject = %subject.id,
                    candidate = %candidate.id,
                    vetoed_by = ?result.vetoed_by,
                    "deal-breaker triggered"
                );
                if options.exclude_vetoed {
                    vetoed += 1;
                    continue;
                }
            }

            tracing::debug!(candidate = %candidate.id, score = result.score, "accepted");
            matches.push(result);
        }

        // Stage 3: rank and limit
        let matches = rank_and_truncate(matches, SortKey::Score, options.limit);

        tracing::info!(
            subject = %subject.id,
            total_candidates,
            prefiltered_out,
            below_cutoff,
            vetoed,
            matches = matches.len(),
            "match generation complete"
        );

        Ok(MatchResult {
            matches,
            total_candidates,
            prefiltered_out,
            below_cutoff,
            vetoed,
        })
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BudgetRange, Cleanliness, Coordinates, Gender, GenderPreference, Location, SmokingTolerance,
    };

    fn create_candidate(id: &str, gender: Gender, min: f64, max: f64, point: Option<Coordinates>) -> Profile {
        let mut profile = Profile::new(id, 24, gender, BudgetRange { min, max });
        if let Some(point) = point {
            profile.location = Location::at(point);
        }
        profile.preferred_gender = Some(GenderPreference::Any);
        profile.cleanliness = Some(Cleanliness::VeryClean);
        profile
    }

    fn create_subject() -> Profile {
        create_candidate(
            "subject",
            Gender::Female,
            200_000.0,
            350_000.0,
            Some(Coordinates::new(6.4281, 3.4216)),
        )
    }

    #[test]
    fn test_generate_matches_basic() {
        let engine = MatchEngine::with_default_weights();
        let subject = create_subject();
        let pool = vec![
            subject.clone(),
            create_candidate("close", Gender::Female, 200_000.0, 350_000.0, Some(Coordinates::new(6.43, 3.42))),
            create_candidate("far", Gender::Male, 900_000.0, 1_000_000.0, Some(Coordinates::new(9.07, 7.39))),
        ];

        let matches = engine.generate_matches(&subject, &pool, 0.45).unwrap();

        assert!(matches.iter().all(|m| m.candidate_id != "subject"));
        assert_eq!(matches[0].candidate_id, "close");
        assert!(matches.iter().all(|m| m.score >= 0.45));
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_min_score_out_of_range_is_rejected() {
        let engine = MatchEngine::default();
        let subject = create_subject();
        let err = engine.generate_matches(&subject, &[], 1.5).unwrap_err();
        assert_eq!(err.field(), Some("minScore"));
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let weights = ScoringWeights { budget: 0.9, ..ScoringWeights::default() };
        assert!(matches!(MatchEngine::new(weights), Err(MatchError::Configuration(_))));
    }

    #[test]
    fn test_invalid_candidate_fails_fast() {
        let engine = MatchEngine::default();
        let subject = create_subject();
        let mut broken = create_candidate("broken", Gender::Male, 100.0, 200.0, None);
        broken.budget = BudgetRange { min: 300.0, max: 100.0 };

        let err = engine.generate_matches(&subject, &[broken], 0.0).unwrap_err();
        assert_eq!(err.field(), Some("broken.budget"));
    }

    #[test]
    fn test_find_matches_proximity_and_limit() {
        let engine = MatchEngine::default();
        let subject = create_subject();
        let pool = vec![
            create_candidate("a", Gender::Female, 200_000.0, 350_000.0, Some(Coordinates::new(6.43, 3.42))),
            create_candidate("b", Gender::Female, 200_000.0, 350_000.0, Some(Coordinates::new(6.44, 3.43))),
            create_candidate("no-coords", Gender::Female, 200_000.0, 350_000.0, None),
            create_candidate("abuja", Gender::Female, 200_000.0, 350_000.0, Some(Coordinates::new(9.07, 7.39))),
        ];
        let options = MatchOptions {
            min_score: 0.0,
            proximity: Some(5.0),
            exclude_vetoed: true,
            limit: Some(1),
        };

        let result = engine.find_matches(&subject, &pool, &options).unwrap();
        assert_eq!(result.total_candidates, 4);
        assert_eq!(result.prefiltered_out, 2);
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn test_find_matches_excludes_vetoed_by_default() {
        let engine = MatchEngine::default();
        let mut subject = create_subject();
        subject.deal_breakers = vec!["smoking-indoors".to_string()];
        let mut smoker = create_candidate("smoker", Gender::Female, 200_000.0, 350_000.0, None);
        smoker.smoking = Some(SmokingTolerance::Anywhere);
        let pool = vec![smoker];

        let result = engine.find_matches(&subject, &pool, &MatchOptions::default()).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.vetoed, 1);

        let flagged = engine.generate_matches(&subject, &pool, 0.0).unwrap();
        assert_eq!(flagged.len(), 1);
        assert!(flagged[0].vetoed);
    }

    #[test]
    fn test_proximity_without_subject_coordinates_is_skipped() {
        let engine = MatchEngine::default();
        let mut subject = create_subject();
        subject.location = Location::named("Lekki, Lagos");
        let pool = vec![create_candidate("a", Gender::Female, 200_000.0, 350_000.0, None)];
        let options = MatchOptions { min_score: 0.0, proximity: Some(5.0), ..MatchOptions::default() };

        let result = engine.find_matches(&subject, &pool, &options).unwrap();
        assert_eq!(result.prefiltered_out, 0);
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<MatchEngine>();
    }
}
