// Core algorithm exports
pub mod compatibility;
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod taxonomy;

pub use compatibility::{compatibility, gender_compatibility, optional_compatibility, Categorical, CompatibilityRule};
pub use distance::{bounding_box, centroid, haversine_distance, is_within_distance};
pub use filters::{filter_by_proximity, nearby_listings, rank_and_truncate, ListingQuery, Located, Rankable, SortKey};
pub use matcher::{MatchEngine, MatchOptions, MatchResult, DEFAULT_MIN_SCORE};
pub use scoring::{budget_overlap, deal_breaker_conflicts, location_compatibility, FactorAggregator};
pub use taxonomy::{LocationTaxonomy, PlaceMatch};
