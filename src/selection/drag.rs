//! Drag-to-segment state machine.

use log::{debug, info, warn};

use super::{generate_segment_id, SelectedSegment, SelectionConfig};
use crate::geo_utils::{distance, linear_position_to_percent};
use crate::projection::{extract_road_segment, find_closest_point_on_road, RoadProjection};
use crate::{Coordinate, Road};

/// State of the segment gesture on the selected road.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    /// No gesture in progress
    Idle,
    /// Pointer is down on the selected road
    Dragging {
        start: RoadProjection,
        /// Unset until the first pointer-move
        end: Option<RoadProjection>,
    },
    /// A segment was selected and is waiting for an action
    Committed(SelectedSegment),
    /// The segment selection was explicitly cancelled
    Cancelled,
}

/// Owns the selected road and the drag state machine on top of it.
///
/// All transitions are synchronous and infallible; events that do not apply
/// to the current state are ignored.
#[derive(Debug, Clone)]
pub struct SegmentSelector {
    config: SelectionConfig,
    road: Option<Road>,
    state: DragState,
    preview: Option<Vec<Coordinate>>,
}

impl Default for SegmentSelector {
    fn default() -> Self {
        Self::new(SelectionConfig::default())
    }
}

impl SegmentSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            road: None,
            state: DragState::Idle,
            preview: None,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    // ========================================================================
    // Road Selection
    // ========================================================================

    /// Select a road, discarding any gesture or segment on the previous one.
    pub fn select_road(&mut self, road: &Road) {
        self.reset_segment();
        info!(
            "[SegmentSelector] Selected road {} ({}, {} points)",
            road.road_id(),
            road.name(),
            road.len()
        );
        self.road = Some(road.clone());
    }

    /// Drop the road selection together with any segment state.
    pub fn clear_selection(&mut self) {
        self.reset_segment();
        self.road = None;
    }

    pub fn selected_road(&self) -> Option<&Road> {
        self.road.as_ref()
    }

    pub fn selected_road_id(&self) -> Option<&str> {
        self.road.as_ref().map(|r| r.road_id())
    }

    // ========================================================================
    // Pointer Events
    // ========================================================================

    /// Pointer pressed on `road_id` at `coord`.
    ///
    /// Starts a drag only when the pointer lands on the selected road and that
    /// road can be segmented. Returns whether a drag started.
    pub fn pointer_down(&mut self, road_id: &str, coord: Coordinate) -> bool {
        let Some(road) = self.road.as_ref() else {
            return false;
        };
        if road.road_id() != road_id {
            return false;
        }
        if !road.is_segmentable() {
            debug!(
                "[SegmentSelector] Road {} has degenerate geometry, ignoring drag",
                road_id
            );
            return false;
        }

        let Some(start) = find_closest_point_on_road(&coord, road.coordinates()) else {
            return false;
        };

        debug!(
            "[SegmentSelector] Drag started at position {:.4}",
            start.linear_position
        );
        self.preview = None;
        self.state = DragState::Dragging { start, end: None };
        true
    }

    /// Pointer moved to `coord`.
    ///
    /// While dragging, re-projects the end point and returns the live preview
    /// geometry. Returns `None` in every other state.
    pub fn pointer_move(&mut self, coord: Coordinate) -> Option<&[Coordinate]> {
        let road = self.road.as_ref()?;
        let DragState::Dragging { start, end } = &mut self.state else {
            return None;
        };

        let projected = find_closest_point_on_road(&coord, road.coordinates())?;
        *end = Some(projected);

        self.preview = Some(extract_road_segment(
            road.coordinates(),
            start.linear_position,
            projected.linear_position,
        ));
        self.preview.as_deref()
    }

    /// Pointer released.
    ///
    /// A drag with a recorded end point commits and returns the segment; a
    /// press without movement returns to idle and yields `None`.
    pub fn pointer_up(&mut self) -> Option<SelectedSegment> {
        let (start, end) = match &self.state {
            DragState::Dragging { start, end } => (*start, *end),
            _ => return None,
        };
        self.state = DragState::Idle;

        let (Some(end), Some(road)) = (end, self.road.as_ref()) else {
            self.preview = None;
            return None;
        };

        if distance(&start.point, &end.point) < self.config.min_drag_distance_m {
            debug!("[SegmentSelector] Drag shorter than minimum, treating as click");
            self.preview = None;
            return None;
        }

        let coords = road.coordinates();
        let percents = linear_position_to_percent(coords, start.linear_position)
            .and_then(|start_percent| {
                linear_position_to_percent(coords, end.linear_position)
                    .map(|end_percent| (start_percent, end_percent))
            })
            .map_err(|e| e.with_road_id(road.road_id()));

        let (start_percent, end_percent) = match percents {
            Ok(p) => p,
            Err(e) => {
                warn!("[SegmentSelector] Cannot commit segment: {}", e);
                self.preview = None;
                return None;
            }
        };

        let segment = SelectedSegment {
            road_id: road.road_id().to_string(),
            segment_id: generate_segment_id(road.road_id(), start_percent, end_percent),
            start_point: start.point,
            end_point: end.point,
            geometry: extract_road_segment(coords, start.linear_position, end.linear_position),
            start_percent,
            end_percent,
        };

        info!(
            "[SegmentSelector] Segment selected: {} ({:.2}% -> {:.2}%, {} points)",
            segment.segment_id,
            start_percent,
            end_percent,
            segment.geometry.len()
        );

        self.preview = Some(segment.geometry.clone());
        self.state = DragState::Committed(segment.clone());
        Some(segment)
    }

    /// Cancel the segment selection. Safe to call in any state.
    pub fn cancel(&mut self) {
        if !matches!(self.state, DragState::Cancelled) {
            debug!("[SegmentSelector] Segment selection cancelled");
        }
        self.preview = None;
        self.state = DragState::Cancelled;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The committed segment, if one is pending an action.
    pub fn committed_segment(&self) -> Option<&SelectedSegment> {
        match &self.state {
            DragState::Committed(segment) => Some(segment),
            _ => None,
        }
    }

    /// Geometry currently highlighted on the map (live drag or committed).
    pub fn preview(&self) -> Option<&[Coordinate]> {
        self.preview.as_deref()
    }

    fn reset_segment(&mut self) {
        self.state = DragState::Idle;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_road(id: &str) -> Road {
        Road::new(
            id,
            "Bandar Road",
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(0.0, 2.0),
            ],
        )
    }

    fn selector_on(road: &Road) -> SegmentSelector {
        let mut selector = SegmentSelector::default();
        selector.select_road(road);
        selector
    }

    #[test]
    fn test_pointer_down_requires_selected_road() {
        let mut selector = SegmentSelector::default();
        assert!(!selector.pointer_down("way_1", Coordinate::new(0.0, 0.5)));
        assert_eq!(selector.state(), &DragState::Idle);

        let road = straight_road("way_1");
        selector.select_road(&road);
        assert!(!selector.pointer_down("way_2", Coordinate::new(0.0, 0.5)));
        assert_eq!(selector.state(), &DragState::Idle);

        assert!(selector.pointer_down("way_1", Coordinate::new(0.0, 0.5)));
        assert!(selector.is_dragging());
    }

    #[test]
    fn test_click_without_move_returns_to_idle() {
        let road = straight_road("way_1");
        let mut selector = selector_on(&road);

        selector.pointer_down("way_1", Coordinate::new(0.0, 0.5));
        assert!(selector.pointer_up().is_none());
        assert_eq!(selector.state(), &DragState::Idle);
        assert!(selector.preview().is_none());
    }

    #[test]
    fn test_drag_commits_segment() {
        let road = straight_road("way_1");
        let mut selector = selector_on(&road);

        selector.pointer_down("way_1", Coordinate::new(0.001, 0.5));
        let preview = selector.pointer_move(Coordinate::new(-0.001, 1.5)).unwrap();
        assert_eq!(preview.len(), 3);

        let segment = selector.pointer_up().unwrap();
        assert_eq!(segment.road_id, "way_1");
        assert!((segment.start_percent - 25.0).abs() < 1e-6);
        assert!((segment.end_percent - 75.0).abs() < 1e-6);
        assert_eq!(segment.segment_id, "way_1_25.00_75.00");
        assert_eq!(segment.geometry.len(), 3);
        assert_eq!(selector.committed_segment(), Some(&segment));
        assert!(selector.preview().is_some());
    }

    #[test]
    fn test_reverse_drag_yields_same_id() {
        let road = straight_road("way_9");

        let mut forward = selector_on(&road);
        forward.pointer_down("way_9", Coordinate::new(0.0, 0.6));
        forward.pointer_move(Coordinate::new(0.0, 1.4));
        let forward = forward.pointer_up().unwrap();

        let mut backward = selector_on(&road);
        backward.pointer_down("way_9", Coordinate::new(0.0, 1.4));
        backward.pointer_move(Coordinate::new(0.0, 0.6));
        let backward = backward.pointer_up().unwrap();

        assert_eq!(forward.segment_id, "way_9_30.00_70.00");
        assert_eq!(forward.segment_id, backward.segment_id);
        assert_eq!(forward.geometry, backward.geometry);
        assert!(backward.is_reversed());
    }

    #[test]
    fn test_last_move_wins() {
        let road = straight_road("way_1");
        let mut selector = selector_on(&road);

        selector.pointer_down("way_1", Coordinate::new(0.0, 0.0));
        selector.pointer_move(Coordinate::new(0.0, 1.9));
        selector.pointer_move(Coordinate::new(0.0, 1.0));
        let segment = selector.pointer_up().unwrap();
        assert!((segment.end_percent - 50.0).abs() < 1e-6);
        assert_eq!(segment.geometry.len(), 2);
    }

    #[test]
    fn test_move_outside_drag_is_ignored() {
        let road = straight_road("way_1");
        let mut selector = selector_on(&road);
        assert!(selector.pointer_move(Coordinate::new(0.0, 1.0)).is_none());
        assert!(selector.pointer_up().is_none());
        assert_eq!(selector.state(), &DragState::Idle);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let road = straight_road("way_1");
        let mut selector = selector_on(&road);

        selector.pointer_down("way_1", Coordinate::new(0.0, 0.2));
        selector.pointer_move(Coordinate::new(0.0, 0.8));
        selector.pointer_up();

        selector.cancel();
        assert_eq!(selector.state(), &DragState::Cancelled);
        assert!(selector.preview().is_none());
        assert!(selector.committed_segment().is_none());

        selector.cancel();
        assert_eq!(selector.state(), &DragState::Cancelled);

        // Road stays selected, so a new drag can start
        assert!(selector.pointer_down("way_1", Coordinate::new(0.0, 0.2)));
    }

    #[test]
    fn test_selecting_other_road_resets_segment() {
        let first = straight_road("way_1");
        let second = straight_road("way_2");
        let mut selector = selector_on(&first);

        selector.pointer_down("way_1", Coordinate::new(0.0, 0.2));
        selector.pointer_move(Coordinate::new(0.0, 0.8));
        assert!(selector.pointer_up().is_some());

        selector.select_road(&second);
        assert_eq!(selector.state(), &DragState::Idle);
        assert!(selector.committed_segment().is_none());
        assert_eq!(selector.selected_road_id(), Some("way_2"));

        // Pointer events on the old road no longer start drags
        assert!(!selector.pointer_down("way_1", Coordinate::new(0.0, 0.2)));
    }

    #[test]
    fn test_degenerate_road_is_unselectable_for_segments() {
        let stub = Road::new("way_3", "Stub", vec![Coordinate::new(0.0, 0.0)]);
        let mut selector = selector_on(&stub);
        assert!(!selector.pointer_down("way_3", Coordinate::new(0.0, 0.0)));

        let flat = Road::new(
            "way_4",
            "Flat",
            vec![Coordinate::new(1.0, 1.0), Coordinate::new(1.0, 1.0)],
        );
        selector.select_road(&flat);
        assert!(!selector.pointer_down("way_4", Coordinate::new(1.0, 1.0)));
        assert_eq!(selector.state(), &DragState::Idle);
    }

    #[test]
    fn test_min_drag_distance() {
        let road = straight_road("way_1");
        let mut selector = SegmentSelector::new(SelectionConfig {
            min_drag_distance_m: 500.0,
            ..SelectionConfig::default()
        });
        selector.select_road(&road);

        selector.pointer_down("way_1", Coordinate::new(0.0, 0.5));
        selector.pointer_move(Coordinate::new(0.0, 0.501)); // ~111 m
        assert!(selector.pointer_up().is_none());
        assert_eq!(selector.state(), &DragState::Idle);
    }

    #[test]
    fn test_clear_selection() {
        let road = straight_road("way_1");
        let mut selector = selector_on(&road);
        selector.clear_selection();
        assert!(selector.selected_road().is_none());
        assert!(!selector.pointer_down("way_1", Coordinate::new(0.0, 0.5)));
    }
}
