use crate::error::{MatchError, Result};
use crate::models::{BoundingBox, Coordinates};
use std::f64::consts::FRAC_PI_2;

/// Earth's radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Approximate miles per degree of latitude
pub const MILES_PER_DEGREE: f64 = 69.0;

/// Distances are reported to one decimal place
const DISTANCE_PRECISION: f64 = 10.0;

/// Padding applied to the box radius so the prefilter never drops a point the
/// exact check would keep: half a rounding step, plus 1% for float error.
const BOX_ROUNDING_SLACK_MILES: f64 = 0.05;
const BOX_SCALE: f64 = 1.01;

/// Calculate the Haversine distance between two points in miles
///
/// Inputs are decimal degrees and must already be in range. The result is
/// rounded to one decimal place so repeated renders stay stable.
#[inline]
pub fn haversine_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    round_distance(haversine_distance_exact(a, b))
}

/// Unrounded great-circle distance in miles
#[inline]
pub fn haversine_distance_exact(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Float error can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

#[inline]
fn round_distance(miles: f64) -> f64 {
    (miles * DISTANCE_PRECISION).round() / DISTANCE_PRECISION
}

/// Calculate a bounding box around a center point
///
/// Much cheaper than Haversine and expressible as range predicates, so it is
/// used to prune candidates before the exact check.
/// 1° latitude ≈ 69 miles. The longitude half-width is the widest reach of
/// the circle, `asin(sin(r / R) / cos(lat))`, which outgrows the flat
/// `r / (69 * cos(lat))` at high latitudes and large radii.
///
/// The box may admit points outside the circle near its corners but never
/// excludes a point within `radius_miles`. Near the poles, or when the box
/// would cross the antimeridian, it spans every longitude.
pub fn bounding_box(center: &Coordinates, radius_miles: f64) -> BoundingBox {
    let padded = radius_miles.max(0.0) * BOX_SCALE + BOX_ROUNDING_SLACK_MILES;
    let lat_delta = padded / MILES_PER_DEGREE;

    let min_lat = (center.lat - lat_delta).max(-90.0);
    let max_lat = (center.lat + lat_delta).min(90.0);

    // cos(lat) is evaluated once per center, not per candidate
    let cos_lat = center.lat.to_radians().cos().abs();
    let sin_reach = (padded / EARTH_RADIUS_MILES).min(FRAC_PI_2).sin();

    // The circle wraps a pole when its reach is at least the distance to it
    let touches_pole = min_lat <= -90.0 || max_lat >= 90.0 || sin_reach >= cos_lat;
    let lng_delta = if touches_pole { 180.0 } else { (sin_reach / cos_lat).asin().to_degrees() };

    let (min_lng, max_lng) = if touches_pole || !lng_delta.is_finite() || lng_delta >= 180.0 {
        (-180.0, 180.0)
    } else {
        let (west, east) = (center.lng - lng_delta, center.lng + lng_delta);
        if west < -180.0 || east > 180.0 {
            (-180.0, 180.0)
        } else {
            (west, east)
        }
    };

    BoundingBox { min_lat, max_lat, min_lng, max_lng }
}

/// Check if `b` lies within `max_miles` of `a` (inclusive)
#[inline]
pub fn is_within_distance(a: &Coordinates, b: &Coordinates, max_miles: f64) -> bool {
    haversine_distance(a, b) <= max_miles
}

/// Arithmetic mean of a set of points
///
/// Adequate for the city-scale clusters the map view centres on; it does not
/// handle sets that straddle the antimeridian.
pub fn centroid(points: &[Coordinates]) -> Result<Coordinates> {
    if points.is_empty() {
        return Err(MatchError::invalid("points", "cannot take the centroid of no points"));
    }

    let count = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));

    Ok(Coordinates::new(lat_sum / count, lng_sum / count))
}

/// Validate a search radius
pub(crate) fn validate_radius(radius_miles: f64) -> Result<()> {
    if !radius_miles.is_finite() || radius_miles <= 0.0 {
        return Err(MatchError::invalid(
            "radius",
            format!("radius must be a positive number of miles, got {radius_miles}"),
        ));
    }
    Ok(())
}
