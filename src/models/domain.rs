use crate::error::{MatchError, Result};
use crate::models::attributes::{
    Cleanliness, DrinkingHabits, Gender, GenderPreference, GuestPolicy, PetPreference, SleepSchedule,
    SmokingTolerance, SocialLevel, StudyHabits, WorkFromHome,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude")]
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reject non-finite values and anything outside lat [-90, 90], lng [-180, 180]
    pub fn validate(&self, field: &str) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(MatchError::invalid(
                format!("{field}.lat"),
                format!("latitude {} is outside [-90, 90]", self.lat),
            ));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(MatchError::invalid(
                format!("{field}.lng"),
                format!("longitude {} is outside [-180, 180]", self.lng),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parse the `"latitude,longitude"` form used by map links and query strings
impl FromStr for Coordinates {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| MatchError::invalid("coordinates", "expected \"latitude,longitude\""))?;

        let parse = |raw: &str, field: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| MatchError::invalid(field, format!("{raw:?}: {e}")))
        };

        let coordinates = Self::new(parse(lat, "coordinates.lat")?, parse(lng, "coordinates.lng")?);
        coordinates.validate("coordinates")?;
        Ok(coordinates)
    }
}

/// Monthly budget or price range, in a single currency unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

impl BudgetRange {
    /// Build a validated range
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate("budget")?;
        Ok(range)
    }

    pub fn validate(&self, field: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(MatchError::invalid(field, "bounds must be finite"));
        }
        if self.min < 0.0 {
            return Err(MatchError::invalid(field, format!("min {} is negative", self.min)));
        }
        if self.min > self.max {
            return Err(MatchError::invalid(
                field,
                format!("min {} exceeds max {}", self.min, self.max),
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Where a profile wants to live: coordinates, a free-text place, or both
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

impl Location {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            coordinates: Some(coordinates),
            place: None,
        }
    }

    pub fn named(place: impl Into<String>) -> Self {
        Self {
            coordinates: None,
            place: Some(place.into()),
        }
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    /// Place name, ignoring blank strings
    pub fn place_name(&self) -> Option<&str> {
        self.place.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn is_unset(&self) -> bool {
        self.coordinates.is_none() && self.place_name().is_none()
    }
}

/// A roommate profile or request, as handed over by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub age: u8,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub occupation: Option<String>,
    pub budget: BudgetRange,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub preferred_gender: Option<GenderPreference>,
    #[serde(default)]
    pub sleep_schedule: Option<SleepSchedule>,
    #[serde(default)]
    pub social_level: Option<SocialLevel>,
    #[serde(default, alias = "cleanlinessLevel")]
    pub cleanliness: Option<Cleanliness>,
    #[serde(default, alias = "smokingTolerance")]
    pub smoking: Option<SmokingTolerance>,
    #[serde(default, alias = "drinkingHabits")]
    pub drinking: Option<DrinkingHabits>,
    #[serde(default, alias = "petPreference")]
    pub pets: Option<PetPreference>,
    #[serde(default)]
    pub study_habits: Option<StudyHabits>,
    #[serde(default)]
    pub work_from_home: Option<WorkFromHome>,
    #[serde(default)]
    pub guest_policy: Option<GuestPolicy>,
    #[serde(default)]
    pub shared_activities: Vec<String>,
    #[serde(default)]
    pub deal_breakers: Vec<String>,
}

impl Profile {
    /// A profile with only the required fields; every categorical attribute is unset
    pub fn new(id: impl Into<String>, age: u8, gender: Gender, budget: BudgetRange) -> Self {
        Self {
            id: id.into(),
            age,
            gender,
            occupation: None,
            budget,
            location: Location::default(),
            preferred_gender: None,
            sleep_schedule: None,
            social_level: None,
            cleanliness: None,
            smoking: None,
            drinking: None,
            pets: None,
            study_habits: None,
            work_from_home: None,
            guest_policy: None,
            shared_activities: Vec::new(),
            deal_breakers: Vec::new(),
        }
    }

    /// Check the contract the scoring functions rely on
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(MatchError::invalid("id", "profile id must not be empty"));
        }
        self.budget.validate(&format!("{}.budget", self.id))?;
        if let Some(coordinates) = &self.location.coordinates {
            coordinates.validate(&format!("{}.location", self.id))?;
        }
        Ok(())
    }

    #[inline]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.coordinates
    }
}

/// A rental listing, used only by proximity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub price: f64,
    #[serde(default = "default_true", alias = "isAvailable")]
    pub available: bool,
}

fn default_true() -> bool { true }

/// Axis-aligned lat/lng rectangle used as a cheap proximity prefilter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    #[inline]
    pub fn contains(&self, point: &Coordinates) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

/// The named factors that make up a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Factor {
    Budget,
    Location,
    Gender,
    Lifestyle,
    Habits,
    Cleanliness,
    Guests,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::Budget,
        Factor::Location,
        Factor::Gender,
        Factor::Lifestyle,
        Factor::Habits,
        Factor::Cleanliness,
        Factor::Guests,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Factor::Budget => "budget",
            Factor::Location => "location",
            Factor::Gender => "gender",
            Factor::Lifestyle => "lifestyle",
            Factor::Habits => "habits",
            Factor::Cleanliness => "cleanliness",
            Factor::Guests => "guests",
        }
    }
}

/// Weight table for the compatibility factors
///
/// Weights must be non-negative and sum to 1. When a factor is excluded for
/// missing data, the remaining weights are re-normalised at scoring time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub budget: f64,
    pub location: f64,
    pub gender: f64,
    pub lifestyle: f64,
    pub habits: f64,
    pub cleanliness: f64,
    pub guests: f64,
}

/// Allowed drift from 1.0 when summing a weight table
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

impl ScoringWeights {
    #[inline]
    pub fn get(&self, factor: Factor) -> f64 {
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

    pub fn sum(&self) -> f64 {
        Factor::ALL.iter().map(|f| self.get(*f)).sum()
    }

    /// Reject negative or non-finite entries and tables that do not sum to 1
    pub fn validate(&self) -> Result<()> {
        for factor in Factor::ALL {
            let weight = self.get(factor);
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchError::Configuration(format!(
                    "weight for {} must be a non-negative number, got {weight}",
                    factor.as_str()
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(MatchError::Configuration(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            budget: 0.20,
            location: 0.20,
            gender: 0.15,
            lifestyle: 0.15,
            habits: 0.10,
            cleanliness: 0.10,
            guests: 0.10,
        }
    }
}

/// Distance decay used when both sides carry coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationScoring {
    /// Full score at or below this distance
    pub same_area_miles: f64,
    /// Zero score at or beyond this distance
    pub max_relevant_miles: f64,
}

impl LocationScoring {
    pub fn validate(&self) -> Result<()> {
        if !self.same_area_miles.is_finite() || self.same_area_miles < 0.0 {
            return Err(MatchError::Configuration(format!(
                "same_area_miles must be non-negative, got {}",
                self.same_area_miles
            )));
        }
        if !self.max_relevant_miles.is_finite() || self.max_relevant_miles <= self.same_area_miles {
            return Err(MatchError::Configuration(format!(
                "max_relevant_miles ({}) must exceed same_area_miles ({})",
                self.max_relevant_miles, self.same_area_miles
            )));
        }
        Ok(())
    }
}

impl Default for LocationScoring {
    fn default() -> Self {
        Self {
            same_area_miles: 1.0,
            max_relevant_miles: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weights_rejects_bad_sum() {
        let weights = ScoringWeights { budget: 0.5, ..ScoringWeights::default() };
        assert!(matches!(weights.validate(), Err(MatchError::Configuration(_))));
    }

    #[test]
    fn test_weights_rejects_negative_entry() {
        let weights = ScoringWeights {
            budget: 0.5,
            location: -0.1,
            ..ScoringWeights::default()
        };
        assert!(matches!(weights.validate(), Err(MatchError::Configuration(_))));
    }

    #[test]
    fn test_budget_range_rejects_inverted_bounds() {
        let err = BudgetRange::new(350_000.0, 200_000.0).unwrap_err();
        assert_eq!(err.field(), Some("budget"));
    }

    #[test]
    fn test_coordinates_parse() {
        let point: Coordinates = "6.4281, 3.4216".parse().unwrap();
        assert_eq!(point, Coordinates::new(6.4281, 3.4216));

        assert!("6.4281".parse::<Coordinates>().is_err());
        assert!("abc,3.4".parse::<Coordinates>().is_err());
        assert!("95.0,3.4".parse::<Coordinates>().is_err());
    }

    #[test]
    fn test_coordinates_validate_rejects_nan() {
        let point = Coordinates::new(f64::NAN, 0.0);
        assert_eq!(point.validate("center").unwrap_err().field(), Some("center.lat"));
    }

    #[test]
    fn test_bounding_box_contains_is_inclusive() {
        let bbox = BoundingBox { min_lat: 0.0, max_lat: 1.0, min_lng: 0.0, max_lng: 1.0 };
        assert!(bbox.contains(&Coordinates::new(1.0, 0.0)));
        assert!(!bbox.contains(&Coordinates::new(1.01, 0.0)));
    }

    #[test]
    fn test_blank_place_is_unset() {
        let location = Location::named("   ");
        assert!(location.place_name().is_none());
        assert!(location.is_unset());
    }

    #[test]
    fn test_listing_deserializes_flat_coordinates() {
        let json = r#"{"id":"l1","latitude":6.5,"longitude":3.3,"price":250000,"isAvailable":false}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.coordinates, Coordinates::new(6.5, 3.3));
        assert!(!listing.available);
    }
}
