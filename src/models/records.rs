//! Boundary adapters for records as the persistence collaborator stores them.
//!
//! Categorical fields arrive as plain strings. A missing or blank string means
//! "unset"; a non-blank string outside the enumeration is rejected.

use crate::error::{MatchError, Result};
use crate::models::domain::{BudgetRange, Coordinates, Location, Profile};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

/// Profile row as persisted by the roommate-request store
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(range(max = 120))]
    pub age: u8,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub occupation: Option<String>,
    #[validate(nested)]
    pub budget: BudgetRecord,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub preferred_gender: String,
    #[serde(default)]
    pub sleep_schedule: String,
    #[serde(default)]
    pub social_level: String,
    #[serde(default)]
    pub cleanliness_level: String,
    #[serde(default)]
    pub smoking_tolerance: String,
    #[serde(default)]
    pub drinking_habits: String,
    #[serde(default)]
    pub pet_preference: String,
    #[serde(default)]
    pub study_habits: String,
    #[serde(default)]
    pub work_from_home: String,
    #[serde(default)]
    pub guest_policy: String,
    #[serde(default)]
    pub shared_activities: Vec<String>,
    #[serde(default)]
    pub deal_breakers: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct BudgetRecord {
    #[validate(range(min = 0.0))]
    pub min: f64,
    #[validate(range(min = 0.0))]
    pub max: f64,
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = MatchError;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        record.validate().map_err(|errors| validation_error(&record.id, &errors))?;

        let budget = BudgetRange { min: record.budget.min, max: record.budget.max };
        budget.validate(&format!("{}.budget", record.id))?;

        let coordinates = match (record.latitude, record.longitude) {
            (Some(lat), Some(lng)) => {
                let point = Coordinates::new(lat, lng);
                point.validate(&format!("{}.location", record.id))?;
                Some(point)
            }
            (None, None) => None,
            _ => {
                return Err(MatchError::invalid(
                    format!("{}.location", record.id),
                    "latitude and longitude must be supplied together",
                ))
            }
        };

        let place = record
            .location
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        Ok(Profile {
            gender: parse_optional(&record.gender)?.unwrap_or_default(),
            preferred_gender: parse_optional(&record.preferred_gender)?,
            sleep_schedule: parse_optional(&record.sleep_schedule)?,
            social_level: parse_optional(&record.social_level)?,
            cleanliness: parse_optional(&record.cleanliness_level)?,
            smoking: parse_optional(&record.smoking_tolerance)?,
            drinking: parse_optional(&record.drinking_habits)?,
            pets: parse_optional(&record.pet_preference)?,
            study_habits: parse_optional(&record.study_habits)?,
            work_from_home: parse_optional(&record.work_from_home)?,
            guest_policy: parse_optional(&record.guest_policy)?,
            id: record.id,
            age: record.age,
            occupation: record.occupation,
            budget,
            location: Location { coordinates, place },
            shared_activities: record.shared_activities,
            deal_breakers: record.deal_breakers,
        })
    }
}

/// Parse a categorical field, treating blank strings as unset
fn parse_optional<T>(raw: &str) -> Result<Option<T>>
where
    T: FromStr<Err = MatchError>,
{
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some)
}

fn validation_error(id: &str, errors: &ValidationErrors) -> MatchError {
    let mut fields: Vec<String> = errors.errors().keys().map(|k| k.to_string()).collect();
    fields.sort();
    MatchError::invalid(format!("{id}.{}", fields.join(",")), errors.to_string())
}
