//! # Algorithm Toolbox
//!
//! Direct access to the standalone algorithms, for callers that want the
//! geometry or aggregation rules without a [`RoadSafetySession`](crate::RoadSafetySession).
//!
//! ## Geometry
//!
//! - **Haversine Distance**: Great-circle distance between coordinates
//! - **Road Length**: Total distance along a polyline
//! - **Percent Addressing**: Linear position to arc-length percent
//! - **Projection**: Closest point on a segment or road
//! - **Extraction**: Sub-polyline between two linear positions
//!
//! ## Ratings
//!
//! - **Segment Identity**: Deterministic ids for percent ranges
//! - **Averaging**: Null-skipping mean used by every aggregate
//! - **Color Mapping**: Segment and road thresholds
//!
//! # Example
//!
//! ```rust
//! use road_safety::algorithms::{
//!     find_closest_point_on_road,
//!     linear_position_to_percent,
//!     generate_segment_id,
//!     Coordinate,
//! };
//!
//! let road = vec![
//!     Coordinate::new(0.0, 0.0),
//!     Coordinate::new(0.0, 1.0),
//!     Coordinate::new(0.0, 2.0),
//! ];
//! let hit = find_closest_point_on_road(&Coordinate::new(0.0, 0.5), &road).unwrap();
//! let percent = linear_position_to_percent(&road, hit.linear_position).unwrap();
//! assert!((percent - 25.0).abs() < 1e-6);
//!
//! assert_eq!(generate_segment_id("way_9", 70.0, 30.0), "way_9_30.00_70.00");
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Bounds, Coordinate, Road, RoadEnvelope};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{
    distance,
    distance_to_point,
    linear_position_to_percent,
    meters_per_degree,
    meters_to_degrees,
    road_length,
    EARTH_RADIUS_M,
};

// =============================================================================
// Projection and Extraction
// =============================================================================

/// Project a point onto one straight segment, clamping to its endpoints.
pub use crate::projection::closest_point_on_segment;

/// Closest point on a whole road.
///
/// Candidates come from planar projection per segment; the winner is the one
/// with the smallest haversine distance, first minimum on ties.
pub use crate::projection::find_closest_point_on_road;

/// Sub-polyline between two linear positions, in road order.
pub use crate::projection::extract_road_segment;

pub use crate::projection::{RoadProjection, SegmentProjection};

// =============================================================================
// Segment Identity
// =============================================================================

pub use crate::selection::{generate_segment_id, parse_segment_id};

// =============================================================================
// Aggregation and Presentation
// =============================================================================

/// Arithmetic mean with `average([]) == 0`.
pub use crate::ratings::average;

pub use crate::colors::{render_stars, road_color, segment_color, SafetyColor};

// =============================================================================
// Spatial Indexing
// =============================================================================

/// R-tree spatial index for fast geographic queries.
///
/// Re-export of rstar's RTree for custom spatial indexing needs.
pub use rstar::RTree;

/// Axis-aligned bounding box for spatial queries.
pub use rstar::AABB;
