// Model exports
pub mod attributes;
pub mod domain;
pub mod records;
pub mod results;

pub use attributes::{
    Cleanliness, DrinkingHabits, Gender, GenderPreference, GuestPolicy, PetPreference, SleepSchedule,
    SmokingTolerance, SocialLevel, StudyHabits, WorkFromHome,
};
pub use domain::{
    BoundingBox, BudgetRange, Coordinates, Factor, Listing, Location, LocationScoring, Profile, ScoringWeights,
};
pub use records::{BudgetRecord, ProfileRecord};
pub use results::{CompatibilityResult, FactorBreakdown, MatchTier, Nearby};
