use crate::models::domain::{Factor, ScoringWeights};
use serde::{Deserialize, Serialize};

/// Per-factor sub-scores in `[0, 1]`
///
/// `None` means the factor was excluded because either side lacked the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanliness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<f64>,
}

impl FactorBreakdown {
    #[inline]
    pub fn get(&self, factor: Factor) -> Option<f64> {
        match factor {
            Factor::Budget => self.budget,
            Factor::Location => self.location,
            Factor::Gender => self.gender,
            Factor::Lifestyle => self.lifestyle,
            Factor::Habits => self.habits,
            Factor::Cleanliness => self.cleanliness,
            Factor::Guests => self.guests,
        }
    }

    /// Factors that were actually scored, in canonical order
    pub fn included(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ALL
            .into_iter()
            .filter_map(|factor| self.get(factor).map(|score| (factor, score)))
    }

    /// Factors that were skipped for insufficient data
    pub fn excluded(&self) -> Vec<Factor> {
        Factor::ALL
            .into_iter()
            .filter(|factor| self.get(*factor).is_none())
            .collect()
    }
}

/// Outcome of scoring one subject against one candidate
///
/// Computed fresh per call; nothing here is cached or mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub subject_id: String,
    pub candidate_id: String,
    /// Overall compatibility in `[0, 1]`
    pub score: f64,
    pub breakdown: FactorBreakdown,
    /// Weight table the score was computed with
    pub weights: ScoringWeights,
    /// Set when a deal-breaker on either side is triggered; the score is left untouched
    pub vetoed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vetoed_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl CompatibilityResult {
    /// Score as a whole percentage
    pub fn percent(&self) -> u8 {
        (self.score * 100.0).round().clamp(0.0, 100.0) as u8
    }

    pub fn tier(&self) -> MatchTier {
        MatchTier::from_score(self.score)
    }

    /// Conversation starters for the weak spots of this pairing
    pub fn recommendations(&self) -> Vec<&'static str> {
        let below = |score: Option<f64>, threshold: f64| score.is_some_and(|s| s < threshold);
        let mut advice = Vec::new();

        if below(self.breakdown.budget, 0.7) {
            advice.push("Consider discussing budget expectations and splitting costs");
        }
        if below(self.breakdown.location, 0.5) {
            advice.push("Location preferences may need compromise - discuss transportation options");
        }
        if below(self.breakdown.lifestyle, 0.6) {
            advice.push("Discuss lifestyle differences and find common ground");
        }
        if below(self.breakdown.habits, 0.7) {
            advice.push("Review living preferences and establish clear house rules");
        }
        if self.vetoed {
            advice.push("One of you listed a deal-breaker that applies here - talk it through first");
        } else if self.score >= 0.8 {
            advice.push("Great match! Consider scheduling a meet-up to discuss next steps");
        }

        advice
    }
}

/// Coarse label for a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    VeryPoor,
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl MatchTier {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.9 => Self::Excellent,
            s if s >= 0.8 => Self::VeryGood,
            s if s >= 0.7 => Self::Good,
            s if s >= 0.6 => Self::Fair,
            s if s >= 0.5 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent Match",
            Self::VeryGood => "Very Good Match",
            Self::Good => "Good Match",
            Self::Fair => "Fair Match",
            Self::Poor => "Poor Match",
            Self::VeryPoor => "Very Poor Match",
        }
    }
}

/// A record that passed a proximity search, with its exact distance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nearby<T> {
    pub item: T,
    pub distance_miles: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(score: f64, breakdown: FactorBreakdown) -> CompatibilityResult {
        CompatibilityResult {
            subject_id: "a".to_string(),
            candidate_id: "b".to_string(),
            score,
            breakdown,
            weights: ScoringWeights::default(),
            vetoed: false,
            vetoed_by: vec![],
            shared_activities: vec![],
            distance_miles: None,
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(MatchTier::from_score(0.95), MatchTier::Excellent);
        assert_eq!(MatchTier::from_score(0.9), MatchTier::Excellent);
        assert_eq!(MatchTier::from_score(0.85), MatchTier::VeryGood);
        assert_eq!(MatchTier::from_score(0.6), MatchTier::Fair);
        assert_eq!(MatchTier::from_score(0.1), MatchTier::VeryPoor);
        assert_eq!(MatchTier::Good.label(), "Good Match");
    }

    #[test]
    fn test_percent_rounds() {
        let result = result_with(0.456, FactorBreakdown::default());
        assert_eq!(result.percent(), 46);
    }

    #[test]
    fn test_recommendations_skip_excluded_factors() {
        let breakdown = FactorBreakdown {
            budget: Some(0.2),
            lifestyle: None,
            ..FactorBreakdown::default()
        };
        let advice = result_with(0.5, breakdown).recommendations();
        assert_eq!(advice.len(), 1);
        assert!(advice[0].contains("budget"));
    }

    #[test]
    fn test_recommendations_for_strong_match() {
        let breakdown = FactorBreakdown {
            budget: Some(1.0),
            location: Some(0.9),
            ..FactorBreakdown::default()
        };
        let advice = result_with(0.92, breakdown).recommendations();
        assert_eq!(advice, vec!["Great match! Consider scheduling a meet-up to discuss next steps"]);
    }

    #[test]
    fn test_breakdown_excluded_lists_missing_factors() {
        let breakdown = FactorBreakdown {
            budget: Some(1.0),
            gender: Some(0.5),
            ..FactorBreakdown::default()
        };
        assert_eq!(breakdown.included().count(), 2);
        assert_eq!(breakdown.excluded().len(), 5);
        assert!(!breakdown.excluded().contains(&Factor::Budget));
    }

    #[test]
    fn test_breakdown_serialization_omits_excluded_factors() {
        let breakdown = FactorBreakdown { budget: Some(0.5), ..FactorBreakdown::default() };
        let json = serde_json::to_value(breakdown).unwrap();
        assert_eq!(json, serde_json::json!({ "budget": 0.5 }));
    }
}
