//! Point-to-polyline projection and sub-segment extraction.
//!
//! Projections are computed in planar lon/lat space, while the "closest"
//! candidate is chosen by haversine distance. The two metrics agree closely
//! at street scale, and keeping them this way matches how positions have
//! always been recorded for existing segment ids.

use serde::Serialize;

use crate::geo_utils::distance;
use crate::Coordinate;

/// Projection of a point onto a single line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Projected point on the segment
    pub point: Coordinate,
    /// Interpolation fraction along the segment, clamped to [0, 1]
    pub t: f64,
}

/// Projection of a point onto a whole road polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadProjection {
    /// Projected point on the road
    pub point: Coordinate,
    /// Index of the segment containing the projection
    pub segment_index: usize,
    /// Interpolation fraction inside that segment
    pub t: f64,
    /// `segment_index + t`
    pub linear_position: f64,
    /// Haversine distance from the query point to the projection (meters)
    pub distance: f64,
}

/// Project `point` onto the segment `[a, b]`, clamping to its endpoints.
///
/// A zero-length segment projects everything onto `a` with `t = 0`.
pub fn closest_point_on_segment(
    point: &Coordinate,
    a: &Coordinate,
    b: &Coordinate,
) -> SegmentProjection {
    let dx = b.longitude - a.longitude;
    let dy = b.latitude - a.latitude;

    if dx == 0.0 && dy == 0.0 {
        return SegmentProjection { point: *a, t: 0.0 };
    }

    let t = ((point.longitude - a.longitude) * dx + (point.latitude - a.latitude) * dy)
        / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);

    SegmentProjection {
        point: a.lerp(b, t),
        t,
    }
}

/// Find the closest point on a road to `point`.
///
/// Every consecutive vertex pair is tried; the first projection with the
/// minimal distance wins. Returns `None` for roads with fewer than two
/// vertices.
///
/// # Example
/// ```
/// use road_safety::{find_closest_point_on_road, Coordinate};
///
/// let road = vec![
///     Coordinate::new(0.0, 0.0),
///     Coordinate::new(0.0, 1.0),
///     Coordinate::new(0.0, 2.0),
/// ];
/// let hit = find_closest_point_on_road(&Coordinate::new(0.0, 0.5), &road).unwrap();
/// assert_eq!(hit.segment_index, 0);
/// assert!((hit.linear_position - 0.5).abs() < 1e-9);
/// ```
pub fn find_closest_point_on_road(
    point: &Coordinate,
    coords: &[Coordinate],
) -> Option<RoadProjection> {
    let mut best: Option<RoadProjection> = None;

    for (i, pair) in coords.windows(2).enumerate() {
        let projection = closest_point_on_segment(point, &pair[0], &pair[1]);
        let d = distance(point, &projection.point);

        if best.map_or(true, |b| d < b.distance) {
            best = Some(RoadProjection {
                point: projection.point,
                segment_index: i,
                t: projection.t,
                linear_position: i as f64 + projection.t,
                distance: d,
            });
        }
    }

    // A hit on the far end of a segment is the start of the next one
    best.map(|hit| {
        if hit.t >= 1.0 && hit.segment_index + 2 < coords.len() {
            RoadProjection {
                point: coords[hit.segment_index + 1],
                segment_index: hit.segment_index + 1,
                t: 0.0,
                ..hit
            }
        } else {
            hit
        }
    })
}

/// Extract the sub-polyline between two linear positions.
///
/// The positions are ordered first, so dragging in either direction yields
/// the same geometry. The result starts at the (possibly interpolated) start
/// position, contains every whole vertex up to the end segment, and finishes
/// at the interpolated end position. Equal positions collapse to a single
/// point. Always returns at least one coordinate for a non-empty road.
pub fn extract_road_segment(coords: &[Coordinate], pos_a: f64, pos_b: f64) -> Vec<Coordinate> {
    if coords.is_empty() {
        return Vec::new();
    }

    let last = (coords.len() - 1) as f64;
    let clamp = |p: f64| if p.is_nan() { 0.0 } else { p.clamp(0.0, last) };
    let (start, end) = {
        let (a, b) = (clamp(pos_a), clamp(pos_b));
        if a > b {
            (b, a)
        } else {
            (a, b)
        }
    };

    let start_segment = start.floor() as usize;
    let end_segment = end.floor() as usize;
    let start_t = start - start.floor();
    let end_t = end - end.floor();

    let mut segment = Vec::with_capacity(end_segment - start_segment + 2);

    if start_t == 0.0 {
        segment.push(coords[start_segment]);
    } else {
        segment.push(coords[start_segment].lerp(&coords[start_segment + 1], start_t));
    }

    segment.extend_from_slice(&coords[start_segment + 1..=end_segment]);

    if end_t > 0.0 && end_segment < coords.len() - 1 {
        segment.push(coords[end_segment].lerp(&coords[end_segment + 1], end_t));
    }

    segment
}
