use crate::core::compatibility::{gender_compatibility, optional_compatibility};
use crate::core::distance::haversine_distance;
use crate::core::taxonomy::LocationTaxonomy;
use crate::error::Result;
use crate::models::{
    BudgetRange, Cleanliness, CompatibilityResult, DrinkingHabits, FactorBreakdown, GuestPolicy, Location,
    LocationScoring, PetPreference, Profile, ScoringWeights, SmokingTolerance, SocialLevel,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Calculate how much two budget ranges overlap (0-1)
///
/// `overlap / total_span`, where the total span runs from the lower of the
/// two minimums to the higher of the two maximums. Two identical
/// zero-width ranges score 1.0.
#[inline]
pub fn budget_overlap(a: &BudgetRange, b: &BudgetRange) -> f64 {
    let overlap = (a.max.min(b.max) - a.min.max(b.min)).max(0.0);
    let total_span = a.max.max(b.max) - a.min.min(b.min);

    if total_span <= 0.0 {
        return 1.0;
    }
    (overlap / total_span).clamp(0.0, 1.0)
}

/// Location score (0-1), or `None` when the two sides cannot be compared
///
/// Coordinates on both sides win: full score inside `same_area_miles`, then a
/// linear decay to zero at `max_relevant_miles`. Otherwise both place names
/// are classified by the taxonomy.
pub fn location_compatibility(
    a: &Location,
    b: &Location,
    taxonomy: &LocationTaxonomy,
    settings: &LocationScoring,
) -> Option<f64> {
    if let (Some(pa), Some(pb)) = (&a.coordinates, &b.coordinates) {
        return Some(distance_score(haversine_distance(pa, pb), settings));
    }

    let (place_a, place_b) = (a.place_name()?, b.place_name()?);
    Some(taxonomy.compare(place_a, place_b).score())
}

/// Linear distance decay, monotone non-increasing in `miles`
#[inline]
fn distance_score(miles: f64, settings: &LocationScoring) -> f64 {
    if miles <= settings.same_area_miles {
        return 1.0;
    }
    if miles >= settings.max_relevant_miles {
        return 0.0;
    }
    let window = settings.max_relevant_miles - settings.same_area_miles;
    1.0 - (miles - settings.same_area_miles) / window
}

/// Mean of the members that could be scored
fn cluster(members: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = members
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sleep, social level, work-from-home and study habits
pub fn lifestyle_score(a: &Profile, b: &Profile) -> Option<f64> {
    cluster(&[
        optional_compatibility(a.sleep_schedule, b.sleep_schedule),
        optional_compatibility(a.social_level, b.social_level),
        optional_compatibility(a.work_from_home, b.work_from_home),
        optional_compatibility(a.study_habits, b.study_habits),
    ])
}

/// Smoking, drinking and pets
pub fn habits_score(a: &Profile, b: &Profile) -> Option<f64> {
    cluster(&[
        optional_compatibility(a.smoking, b.smoking),
        optional_compatibility(a.drinking, b.drinking),
        optional_compatibility(a.pets, b.pets),
    ])
}

/// Per-factor breakdown for a pair; skipped factors are `None`
pub fn factor_breakdown(
    a: &Profile,
    b: &Profile,
    taxonomy: &LocationTaxonomy,
    location: &LocationScoring,
) -> FactorBreakdown {
    FactorBreakdown {
        budget: Some(budget_overlap(&a.budget, &b.budget)),
        location: location_compatibility(&a.location, &b.location, taxonomy, location),
        gender: gender_compatibility(a.gender, a.preferred_gender, b.gender, b.preferred_gender),
        lifestyle: lifestyle_score(a, b),
        habits: habits_score(a, b),
        cleanliness: optional_compatibility(a.cleanliness, b.cleanliness),
        guests: optional_compatibility(a.guest_policy, b.guest_policy),
    }
}

/// Weighted sum over the factors present, with weights re-normalised over them
///
/// Returns 0.0 when nothing could be scored or every present factor carries
/// zero weight.
pub fn weighted_score(breakdown: &FactorBreakdown, weights: &ScoringWeights) -> f64 {
    let (total, weight_sum) = breakdown
        .included()
        .fold((0.0, 0.0), |(total, weight_sum), (factor, score)| {
            let weight = weights.get(factor);
            (total + score * weight, weight_sum + weight)
        });

    if weight_sum <= 0.0 {
        return 0.0;
    }
    (total / weight_sum).clamp(0.0, 1.0)
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Tags a profile "exhibits" for deal-breaker purposes
///
/// Shared activities plus tags derived from categorical attributes.
pub fn trait_tags(profile: &Profile) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = profile
        .shared_activities
        .iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .collect();

    let derived = [
        (profile.smoking == Some(SmokingTolerance::Anywhere), "smoking-indoors"),
        (
            matches!(profile.pets, Some(PetPreference::OkayWithPets | PetPreference::LovePets)),
            "pets",
        ),
        (profile.guest_policy == Some(GuestPolicy::FrequentGuests), "too-many-guests"),
        (profile.cleanliness == Some(Cleanliness::Relaxed), "messy-common-areas"),
        (profile.social_level == Some(SocialLevel::VerySocial), "loud-music-noise"),
        (profile.drinking == Some(DrinkingHabits::RegularDrinker), "heavy-drinking"),
    ];
    tags.extend(
        derived
            .into_iter()
            .filter(|(applies, _)| *applies)
            .map(|(_, tag)| tag.to_string()),
    );

    tags
}

/// Deal-breakers on either side triggered by the other side's traits
///
/// Symmetric: `deal_breaker_conflicts(a, b)` and `deal_breaker_conflicts(b, a)`
/// return the same set. Sorted and de-duplicated.
pub fn deal_breaker_conflicts(a: &Profile, b: &Profile) -> Vec<String> {
    let one_way = |holder: &Profile, other: &Profile| -> BTreeSet<String> {
        let traits = trait_tags(other);
        holder
            .deal_breakers
            .iter()
            .map(|t| normalize_tag(t))
            .filter(|t| traits.contains(t))
            .collect()
    };

    let mut conflicts = one_way(a, b);
    conflicts.extend(one_way(b, a));
    conflicts.into_iter().collect()
}

/// Activity tags both profiles list, compared case-insensitively
pub fn shared_activities(a: &Profile, b: &Profile) -> Vec<String> {
    let theirs: BTreeSet<String> = b.shared_activities.iter().map(|t| normalize_tag(t)).collect();
    let shared: BTreeSet<String> = a
        .shared_activities
        .iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty() && theirs.contains(t))
        .collect();
    shared.into_iter().collect()
}

/// Combines the factor scores of a pair into one result
///
/// Cheap to clone; the taxonomy is shared.
#[derive(Debug, Clone)]
pub struct FactorAggregator {
    weights: ScoringWeights,
    location: LocationScoring,
    taxonomy: Arc<LocationTaxonomy>,
}

impl FactorAggregator {
    /// Build an aggregator, rejecting weight tables and decay settings that
    /// would produce meaningless scores
    pub fn new(
        weights: ScoringWeights,
        location: LocationScoring,
        taxonomy: Arc<LocationTaxonomy>,
    ) -> Result<Self> {
        weights.validate()?;
        location.validate()?;
        Ok(Self { weights, location, taxonomy })
    }

    pub fn with_taxonomy(self, taxonomy: Arc<LocationTaxonomy>) -> Self {
        Self { taxonomy, ..self }
    }

    pub fn with_location_scoring(self, location: LocationScoring) -> Result<Self> {
        location.validate()?;
        Ok(Self { location, ..self })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn location_scoring(&self) -> &LocationScoring {
        &self.location
    }

    pub fn taxonomy(&self) -> &Arc<LocationTaxonomy> {
        &self.taxonomy
    }

    /// Score `candidate` from the point of view of `subject`
    ///
    /// The numeric score is symmetric in its two arguments; only the ids are
    /// ordered. A deal-breaker conflict marks the result as vetoed without
    /// touching the score.
    pub fn aggregate(&self, subject: &Profile, candidate: &Profile) -> CompatibilityResult {
        let breakdown = factor_breakdown(subject, candidate, &self.taxonomy, &self.location);
        let score = weighted_score(&breakdown, &self.weights);
        let vetoed_by = deal_breaker_conflicts(subject, candidate);

        if breakdown.included().next().is_none() {
            tracing::debug!(subject = %subject.id, candidate = %candidate.id, "no factor could be scored");
        }

        let distance_miles = match (subject.coordinates(), candidate.coordinates()) {
            (Some(a), Some(b)) => Some(haversine_distance(&a, &b)),
            _ => None,
        };

        CompatibilityResult {
            subject_id: subject.id.clone(),
            candidate_id: candidate.id.clone(),
            score,
            breakdown,
            weights: self.weights,
            vetoed: !vetoed_by.is_empty(),
            vetoed_by,
            shared_activities: shared_activities(subject, candidate),
            distance_miles,
        }
    }
}

impl Default for FactorAggregator {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            location: LocationScoring::default(),
            taxonomy: LocationTaxonomy::builtin(),
        }
    }
}
