//! # Road Safety
//!
//! Road segment selection and safety rating aggregation for map clients.
//!
//! This library provides:
//! - Geometry on road polylines (haversine length, percent addressing,
//!   closest-point projection, sub-segment extraction)
//! - A drag-to-segment state machine that turns pointer gestures into
//!   stable, percent-addressed road segments
//! - In-memory rating stores with eagerly recomputed aggregates
//! - Safety color mapping for the map layer
//!
//! ## Features
//!
//! - **`parallel`** - Prepare large road networks with rayon
//! - **`http`** - Enable the REST client for rating and alert sync
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use road_safety::{Coordinate, Road, SegmentSelector};
//!
//! let road = Road::new(
//!     "way_9",
//!     "MG Road",
//!     vec![
//!         Coordinate::new(80.6480, 16.5062),
//!         Coordinate::new(80.6490, 16.5070),
//!         Coordinate::new(80.6500, 16.5080),
//!     ],
//! );
//!
//! let mut selector = SegmentSelector::default();
//! selector.select_road(&road);
//! selector.pointer_down("way_9", Coordinate::new(80.6481, 16.5063));
//! selector.pointer_move(Coordinate::new(80.6499, 16.5079));
//!
//! if let Some(segment) = selector.pointer_up() {
//!     println!("Selected {}", segment.segment_id);
//! }
//! ```

use geo::{BoundingRect, Coord, LineString};
use rstar::{RTreeObject, AABB};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, RoadSafetyError};

// Geographic utilities (distance, length, percent addressing)
pub mod geo_utils;
pub use geo_utils::{
    distance, distance_to_point, linear_position_to_percent, road_length,
};

// Point-to-polyline projection and sub-segment extraction
pub mod projection;
pub use projection::{
    closest_point_on_segment, extract_road_segment, find_closest_point_on_road, RoadProjection,
    SegmentProjection,
};

// Segment identity and the drag-to-segment state machine
pub mod selection;
pub use selection::{
    generate_segment_id, parse_segment_id, DragState, SegmentSelector, SelectedSegment,
    SelectionConfig,
};

// Rating records, validation and aggregation
pub mod ratings;
pub use ratings::{Aggregate, Rating, RatingStore, RatingSubmission, RoadRatingSummary};

// Color/presentation mapping
pub mod colors;
pub use colors::{render_stars, road_color, segment_color, SafetyColor};

// Road alerts
pub mod alerts;
pub use alerts::{AlertType, NewAlert, RoadAlert};

// Road network loading and hit testing
pub mod network;
pub use network::{RoadNetwork, RoadStyle};

// Application session (owns stores and selection state)
pub mod session;
pub use session::{Notification, RoadSafetySession, SessionStats};

// Algorithm toolbox - modular access to all algorithms
pub mod algorithms;

// HTTP module for rating/alert sync
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{ClientConfig, SafetyApiClient};

// ============================================================================
// Core Types
// ============================================================================

/// A map coordinate as (longitude, latitude) in degrees.
///
/// Serialized as a GeoJSON position `[lon, lat]`.
///
/// # Example
/// ```
/// use road_safety::Coordinate;
/// let point = Coordinate::new(80.6480, 16.5062); // Vijayawada
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Check if the coordinate is within valid lon/lat ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Linear interpolation towards `other` (planar, in degrees).
    pub fn lerp(&self, other: &Coordinate, t: f64) -> Coordinate {
        Coordinate::new(
            self.longitude + t * (other.longitude - self.longitude),
            self.latitude + t * (other.latitude - self.latitude),
        )
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(pair: [f64; 2]) -> Self {
        Coordinate::new(pair[0], pair[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.longitude, c.latitude]
    }
}

impl From<Coordinate> for Coord {
    fn from(c: Coordinate) -> Self {
        Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

/// Bounding box for a road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from coordinates.
    pub fn from_coordinates(coords: &[Coordinate]) -> Option<Self> {
        let line: LineString = coords.iter().map(|c| Coord::from(*c)).collect();
        let rect = line.bounding_rect()?;
        Some(Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }
}

/// A named road polyline.
///
/// The coordinate sequence is fixed at construction; there is no way to
/// mutate it afterwards, so every segment computed against a road stays
/// valid for the whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct Road {
    road_id: String,
    name: String,
    coordinates: Vec<Coordinate>,
    length: f64,
    bounds: Option<Bounds>,
}

impl Road {
    /// Create a road from its id, display name and coordinates.
    pub fn new(road_id: impl Into<String>, name: impl Into<String>, coordinates: Vec<Coordinate>) -> Self {
        let length = road_length(&coordinates);
        let bounds = Bounds::from_coordinates(&coordinates);
        Self {
            road_id: road_id.into(),
            name: name.into(),
            coordinates,
            length,
            bounds,
        }
    }

    pub fn road_id(&self) -> &str {
        &self.road_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Total haversine length in meters.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Whether a sub-segment can be selected on this road.
    ///
    /// Requires at least two vertices and a non-zero length, otherwise
    /// percent conversion would divide by zero.
    pub fn is_segmentable(&self) -> bool {
        self.coordinates.len() >= 2 && self.length > 0.0
    }

    /// Envelope entry for the road R-tree.
    pub(crate) fn envelope_entry(&self, index: usize) -> Option<RoadEnvelope> {
        self.bounds.map(|b| RoadEnvelope {
            index,
            min_lat: b.min_lat,
            max_lat: b.max_lat,
            min_lng: b.min_lng,
            max_lng: b.max_lng,
        })
    }
}

// ============================================================================
// Spatial Indexing Types
// ============================================================================

/// Bounding box of a road in the network (used for spatial indexing).
#[derive(Debug, Clone)]
pub struct RoadEnvelope {
    /// Index of the road inside its network
    pub index: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl RTreeObject for RoadEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_road() -> Road {
        Road::new(
            "way_1",
            "Eluru Road",
            vec![
                Coordinate::new(80.6480, 16.5062),
                Coordinate::new(80.6490, 16.5070),
                Coordinate::new(80.6500, 16.5080),
            ],
        )
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(80.6480, 16.5062).is_valid());
        assert!(!Coordinate::new(0.0, 91.0).is_valid());
        assert!(!Coordinate::new(181.0, 0.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_coordinate_serializes_as_position() {
        let json = serde_json::to_string(&Coordinate::new(1.5, 2.5)).unwrap();
        assert_eq!(json, "[1.5,2.5]");

        let parsed: Coordinate = serde_json::from_str("[80.1,16.2]").unwrap();
        assert_eq!(parsed, Coordinate::new(80.1, 16.2));
    }

    #[test]
    fn test_road_metadata() {
        let road = sample_road();
        assert_eq!(road.road_id(), "way_1");
        assert_eq!(road.len(), 3);
        assert!(road.length() > 0.0);
        assert!(road.is_segmentable());

        let bounds = road.bounds().unwrap();
        assert_eq!(bounds.min_lng, 80.6480);
        assert_eq!(bounds.max_lat, 16.5080);
        let center = bounds.center();
        assert!((center.longitude - 80.6490).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_roads_are_not_segmentable() {
        let single = Road::new("way_2", "Stub", vec![Coordinate::new(80.0, 16.0)]);
        assert!(!single.is_segmentable());

        let zero_length = Road::new(
            "way_3",
            "Loop",
            vec![Coordinate::new(80.0, 16.0), Coordinate::new(80.0, 16.0)],
        );
        assert_eq!(zero_length.length(), 0.0);
        assert!(!zero_length.is_segmentable());
    }
}
