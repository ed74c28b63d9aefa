use crate::core::distance::{bounding_box, haversine_distance, validate_radius};
use crate::error::Result;
use crate::models::{BudgetRange, CompatibilityResult, Coordinates, Listing, Nearby, Profile};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Anything with an id that may sit at a point on the map
pub trait Located {
    fn id(&self) -> &str;
    fn coordinates(&self) -> Option<Coordinates>;
}

impl Located for Profile {
    fn id(&self) -> &str {
        &self.id
    }

    fn coordinates(&self) -> Option<Coordinates> {
        self.location.coordinates
    }
}

impl Located for Listing {
    fn id(&self) -> &str {
        &self.id
    }

    fn coordinates(&self) -> Option<Coordinates> {
        Some(self.coordinates)
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn coordinates(&self) -> Option<Coordinates> {
        (**self).coordinates()
    }
}

/// Keep candidates within `radius_miles` of `center` (inclusive)
///
/// Two stages:
/// 1. Bounding box pre-filter, cheap range checks only
/// 2. Exact Haversine distance on the survivors
///
/// Candidates without coordinates are dropped. A candidate with
/// out-of-range coordinates is an error, not a silent miss. Input order is
/// preserved.
pub fn filter_by_proximity<'a, T: Located>(
    center: &Coordinates,
    radius_miles: f64,
    candidates: &'a [T],
) -> Result<Vec<Nearby<&'a T>>> {
    center.validate("center")?;
    validate_radius(radius_miles)?;

    let bbox = bounding_box(center, radius_miles);
    let mut in_box = 0usize;
    let mut hits = Vec::new();

    for candidate in candidates {
        let Some(point) = candidate.coordinates() else {
            continue;
        };
        point.validate(&format!("{}.location", candidate.id()))?;

        // Stage 1: bounding box
        if !bbox.contains(&point) {
            continue;
        }
        in_box += 1;

        // Stage 2: exact distance
        let distance_miles = haversine_distance(center, &point);
        if distance_miles <= radius_miles {
            hits.push(Nearby { item: candidate, distance_miles });
        }
    }

    tracing::debug!(
        candidates = candidates.len(),
        in_box,
        within_radius = hits.len(),
        radius_miles,
        "proximity filter"
    );

    Ok(hits)
}

/// Ordering for [`rank_and_truncate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Nearest first
    Distance,
    /// Highest score first
    Score,
}

/// A result that can be ranked
///
/// Missing values sort after present ones regardless of direction.
pub trait Rankable {
    fn rank_id(&self) -> &str;
    fn rank_score(&self) -> Option<f64>;
    fn rank_distance(&self) -> Option<f64>;
}

impl Rankable for CompatibilityResult {
    fn rank_id(&self) -> &str {
        &self.candidate_id
    }

    fn rank_score(&self) -> Option<f64> {
        Some(self.score)
    }

    fn rank_distance(&self) -> Option<f64> {
        self.distance_miles
    }
}

impl<T: Located> Rankable for Nearby<T> {
    fn rank_id(&self) -> &str {
        self.item.id()
    }

    fn rank_score(&self) -> Option<f64> {
        None
    }

    fn rank_distance(&self) -> Option<f64> {
        Some(self.distance_miles)
    }
}

fn compare_present(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ordering = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort by `key`, tie-break on id ascending, then truncate to `limit`
///
/// Truncation happens after sorting, so the cut always keeps the best
/// ranked entries.
pub fn rank_and_truncate<R: Rankable>(mut results: Vec<R>, key: SortKey, limit: Option<usize>) -> Vec<R> {
    results.sort_by(|a, b| {
        let primary = match key {
            SortKey::Distance => compare_present(a.rank_distance(), b.rank_distance(), false),
            SortKey::Score => compare_present(a.rank_score(), b.rank_score(), true),
        };
        primary.then_with(|| a.rank_id().cmp(b.rank_id()))
    });

    if let Some(limit) = limit {
        results.truncate(limit);
    }
    results
}

/// Non-spatial constraints for a listing search
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// Inclusive price bounds
    #[serde(default)]
    pub price_range: Option<BudgetRange>,
    #[serde(default)]
    pub available_only: bool,
}

impl ListingQuery {
    #[inline]
    pub fn matches(&self, listing: &Listing) -> bool {
        if self.available_only && !listing.available {
            return false;
        }
        self.price_range.map_or(true, |range| range.contains(listing.price))
    }
}

/// Listings within `radius_miles` that satisfy `query`, nearest first
pub fn nearby_listings<'a>(
    center: &Coordinates,
    radius_miles: f64,
    listings: &'a [Listing],
    query: &ListingQuery,
) -> Result<Vec<Nearby<&'a Listing>>> {
    if let Some(range) = &query.price_range {
        range.validate("priceRange")?;
    }

    let hits = filter_by_proximity(center, radius_miles, listings)?
        .into_iter()
        .filter(|hit| query.matches(hit.item))
        .collect();

    Ok(rank_and_truncate(hits, SortKey::Distance, None))
}
