//! Geographic utilities for road polylines.
//!
//! Distances are great-circle (haversine) meters on a sphere of radius
//! [`EARTH_RADIUS_M`]. Positions along a road are addressed two ways:
//!
//! - **Linear position**: `segment_index + t`, where `t ∈ [0, 1)` is the
//!   interpolation fraction inside that segment. `N - 1` is the last vertex.
//! - **Percent position**: arc-length from the first vertex as a percentage
//!   of the total road length, `0..=100`.

use crate::error::{RoadSafetyError, Result};
use crate::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two coordinates.
///
/// # Example
/// ```
/// use road_safety::{distance, Coordinate};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.0, 1.0);
/// assert!((distance(&a, &b) - 111_195.0).abs() < 1.0);
/// ```
pub fn distance(p1: &Coordinate, p2: &Coordinate) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Total length of a polyline in meters.
///
/// Zero for empty and single-vertex roads.
pub fn road_length(coords: &[Coordinate]) -> f64 {
    coords.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Distance in meters from the first vertex to a linear position.
///
/// Whole segments are summed up to `floor(linear_position)`, then the
/// fraction `t` of the segment at that index is added. When the index runs
/// past the last segment the accumulated distance is returned as-is.
pub fn distance_to_point(coords: &[Coordinate], linear_position: f64) -> f64 {
    if coords.len() < 2 || !(linear_position > 0.0) {
        return 0.0;
    }

    let segment_count = coords.len() - 1;
    let segment_index = linear_position.floor() as usize;
    let t = linear_position - linear_position.floor();

    let mut accumulated: f64 = coords
        .windows(2)
        .take(segment_index.min(segment_count))
        .map(|w| distance(&w[0], &w[1]))
        .sum();

    if t > 0.0 && segment_index < segment_count {
        let segment_length = distance(&coords[segment_index], &coords[segment_index + 1]);
        accumulated += segment_length * t;
    }

    accumulated
}

/// Convert a linear position to a percentage of the road's length.
///
/// Returns [`RoadSafetyError::DegenerateGeometry`] for roads with zero
/// length, where the percentage is undefined.
///
/// # Example
/// ```
/// use road_safety::{linear_position_to_percent, Coordinate};
///
/// let road = vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)];
/// let pct = linear_position_to_percent(&road, 0.5).unwrap();
/// assert!((pct - 50.0).abs() < 1e-9);
/// ```
pub fn linear_position_to_percent(coords: &[Coordinate], linear_position: f64) -> Result<f64> {
    let total = road_length(coords);
    if total <= 0.0 {
        // The caller owns the road id and attaches it
        return Err(RoadSafetyError::DegenerateGeometry {
            road_id: String::new(),
            message: format!("road of {} points has zero length", coords.len()),
        });
    }

    Ok(distance_to_point(coords, linear_position) / total * 100.0)
}

/// Approximate meters-per-degree conversion at a reference latitude.
///
/// Returns `(meters per degree latitude, meters per degree longitude)`.
pub fn meters_per_degree(ref_lat: f64) -> (f64, f64) {
    let per_lat = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
    (per_lat, per_lat * ref_lat.to_radians().cos())
}

/// Convert a distance in meters to degrees of latitude.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / meters_per_degree(0.0).0
}
