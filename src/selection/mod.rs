//! # Segment Selection
//!
//! Turns a pointer drag along the selected road into a committed,
//! percent-addressed segment of that road.
//!
//! ## Flow
//! 1. A click selects a road ([`SegmentSelector::select_road`])
//! 2. Pointer-down on that same road starts a drag at the projected point
//! 3. Every pointer-move re-projects the end point and refreshes the preview
//! 4. Pointer-up commits the segment, or falls back to idle for a plain click
//!
//! Committed segments carry a deterministic id (see [`generate_segment_id`]),
//! so ratings for the same stretch of road accumulate under one key.

mod drag;
mod identity;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

pub use drag::{DragState, SegmentSelector};
pub use identity::{generate_segment_id, parse_segment_id};

/// Configuration for segment selection and road hit testing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Maximum distance from a road for a pointer event to hit it (meters)
    pub hit_tolerance_m: f64,
    /// Minimum distance between drag endpoints for a drag to commit (meters).
    /// Shorter drags are treated as plain clicks.
    pub min_drag_distance_m: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            hit_tolerance_m: 15.0,    // about half a road width at city zoom
            min_drag_distance_m: 0.0, // any movement counts as a drag
        }
    }
}

/// A committed sub-segment of the selected road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedSegment {
    /// Road the segment belongs to
    pub road_id: String,
    /// Stable id derived from the road id and rounded percent bounds
    pub segment_id: String,
    /// Projected point where the drag started
    pub start_point: Coordinate,
    /// Projected point where the drag ended
    pub end_point: Coordinate,
    /// Sub-polyline between the two points, in road order
    pub geometry: Vec<Coordinate>,
    /// Percent position of the drag start (in drag order)
    pub start_percent: f64,
    /// Percent position of the drag end (in drag order)
    pub end_percent: f64,
}

impl SelectedSegment {
    /// Percent bounds ordered and clamped so that `0 <= start <= end <= 100`.
    pub fn percent_range(&self) -> (f64, f64) {
        let a = self.start_percent.clamp(0.0, 100.0);
        let b = self.end_percent.clamp(0.0, 100.0);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Whether the drag ran against the road's vertex order.
    pub fn is_reversed(&self) -> bool {
        self.end_percent < self.start_percent
    }
}
