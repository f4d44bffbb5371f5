//! # Road Safety Session
//!
//! Owns everything one map client needs: the road network, the segment
//! selector, the road- and segment-level rating stores and the alerts seen
//! so far. All state changes are plain `&mut self` calls.
//!
//! Submissions are optimistic. A rating or alert is validated, applied to the
//! local stores at once, and handed back to the caller for a best-effort
//! background sync (see `http::SafetyApiClient::spawn_rating_sync`). The sync
//! outcome only ever produces a [`Notification`]; local state is never rolled
//! back.

use std::collections::HashMap;

use chrono::Utc;
use log::{debug, info};
use serde::Serialize;

use crate::alerts::{sort_recent_first, NewAlert, RoadAlert};
use crate::colors::{segment_color, SafetyColor};
use crate::error::{OptionExt, Result, RoadSafetyError};
use crate::network::{road_style, RoadNetwork, RoadStyle};
use crate::projection::find_closest_point_on_road;
use crate::ratings::{Aggregate, Rating, RatingStore, RatingSubmission, RoadRatingSummary};
use crate::selection::{parse_segment_id, SegmentSelector, SelectedSegment, SelectionConfig};
use crate::{Coordinate, Road};

/// User-facing outcome of a background sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// The server accepted the rating
    RatingSaved { target_id: String },
    /// The rating is kept locally but the server did not accept it
    SavedLocallySyncFailed { target_id: String, message: String },
    /// The server accepted the alert
    AlertReported { road_id: String },
    /// The alert is kept locally but the server did not accept it
    AlertSyncFailed { road_id: String, message: String },
}

impl Notification {
    /// Notification for a finished rating sync.
    pub fn from_rating_sync(target_id: &str, result: &Result<()>) -> Self {
        match result {
            Ok(()) => Notification::RatingSaved {
                target_id: target_id.to_string(),
            },
            Err(e) => Notification::SavedLocallySyncFailed {
                target_id: target_id.to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Notification for a finished alert sync.
    pub fn from_alert_sync(road_id: &str, result: &Result<()>) -> Self {
        match result {
            Ok(()) => Notification::AlertReported {
                road_id: road_id.to_string(),
            },
            Err(e) => Notification::AlertSyncFailed {
                road_id: road_id.to_string(),
                message: e.to_string(),
            },
        }
    }

    /// Toast text shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Notification::RatingSaved { .. } => "Rating submitted successfully!",
            Notification::SavedLocallySyncFailed { .. } => {
                "Saved locally, but failed to sync with server"
            }
            Notification::AlertReported { .. } => "Alert reported. Thank you for keeping others safe!",
            Notification::AlertSyncFailed { .. } => "Alert saved locally, but failed to sync with server",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notification::SavedLocallySyncFailed { .. } | Notification::AlertSyncFailed { .. }
        )
    }
}

/// Session counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub road_count: usize,
    pub rated_road_count: usize,
    pub road_rating_count: usize,
    pub rated_segment_count: usize,
    pub segment_rating_count: usize,
    pub alert_count: usize,
}

/// State of one map client.
#[derive(Debug)]
pub struct RoadSafetySession {
    network: RoadNetwork,
    selector: SegmentSelector,
    road_ratings: RatingStore,
    segment_ratings: RatingStore,
    alerts: HashMap<String, Vec<RoadAlert>>,
}

impl RoadSafetySession {
    /// Create a session with default selection config.
    pub fn new(network: RoadNetwork) -> Self {
        Self::with_config(network, SelectionConfig::default())
    }

    pub fn with_config(network: RoadNetwork, config: SelectionConfig) -> Self {
        info!("[RoadSafetySession] Started with {} roads", network.len());
        Self {
            network,
            selector: SegmentSelector::new(config),
            road_ratings: RatingStore::new(),
            segment_ratings: RatingStore::new(),
            alerts: HashMap::new(),
        }
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn selector(&self) -> &SegmentSelector {
        &self.selector
    }

    pub fn road_ratings(&self) -> &RatingStore {
        &self.road_ratings
    }

    pub fn segment_ratings(&self) -> &RatingStore {
        &self.segment_ratings
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a road by id.
    pub fn click_road(&mut self, road_id: &str) -> Result<&Road> {
        let road = self.network.road(road_id).ok_or_unknown_road(road_id)?;
        self.selector.select_road(road);
        Ok(road)
    }

    /// Select the road under the pointer, if any.
    ///
    /// A click that misses every road keeps the current selection.
    pub fn click_at(&mut self, point: Coordinate) -> Option<&Road> {
        let tolerance = self.selector.config().hit_tolerance_m;
        let (road, _) = self.network.road_at(&point, tolerance)?;
        self.selector.select_road(road);
        Some(road)
    }

    pub fn clear_selection(&mut self) {
        self.selector.clear_selection();
    }

    /// Start a drag if the pointer is on the selected road.
    pub fn pointer_down(&mut self, point: Coordinate) -> bool {
        let Some(road) = self.selector.selected_road() else {
            return false;
        };
        let tolerance = self.selector.config().hit_tolerance_m;
        let on_road = find_closest_point_on_road(&point, road.coordinates())
            .map_or(false, |hit| hit.distance <= tolerance);
        if !on_road {
            return false;
        }

        let road_id = road.road_id().to_string();
        self.selector.pointer_down(&road_id, point)
    }

    pub fn pointer_move(&mut self, point: Coordinate) -> Option<&[Coordinate]> {
        self.selector.pointer_move(point)
    }

    pub fn pointer_up(&mut self) -> Option<SelectedSegment> {
        self.selector.pointer_up()
    }

    pub fn cancel(&mut self) {
        self.selector.cancel();
    }

    // ========================================================================
    // Ratings
    // ========================================================================

    /// Validate a road rating and apply it locally.
    ///
    /// Returns the validated submission for background sync. A rejected
    /// submission leaves every store untouched.
    pub fn submit_road_rating(&mut self, submission: RatingSubmission) -> Result<RatingSubmission> {
        submission.validate()?;
        self.network
            .road(&submission.road_id)
            .ok_or_unknown_road(&submission.road_id)?;

        let rating = submission.to_rating(Utc::now());
        if let Some(aggregate) = self.road_ratings.add_rating(&submission.road_id, rating) {
            debug!(
                "[RoadSafetySession] {} now {:.2} over {} reviews",
                submission.road_id, aggregate.average_rating, aggregate.total_reviews
            );
        }
        Ok(submission)
    }

    /// Validate a segment rating and apply it locally.
    ///
    /// Once applied, the segment selection is cancelled and its highlight
    /// cleared. A rejected rating leaves the selection as it was.
    pub fn submit_segment_rating(&mut self, segment_id: &str, mut rating: Rating) -> Result<Option<&Aggregate>> {
        let (road_id, _, _) = parse_segment_id(segment_id).ok_or_else(|| {
            RoadSafetyError::validation("segmentId", format!("'{}' is not a segment id", segment_id))
        })?;
        self.network.road(road_id).ok_or_unknown_road(road_id)?;

        if rating.rating.is_none() {
            return Err(RoadSafetyError::validation("rating", "rating is required"));
        }
        rating.validate()?;
        rating.timestamp.get_or_insert_with(Utc::now);

        self.selector.cancel();
        Ok(self.segment_ratings.add_rating(segment_id, rating))
    }

    /// Replace road ratings with the server's full listing.
    pub fn load_ratings(&mut self, summaries: impl IntoIterator<Item = RoadRatingSummary>) {
        self.road_ratings.replace_all(summaries);
    }

    /// Style properties of every road in the network.
    pub fn road_styles(&self) -> Vec<RoadStyle> {
        self.network.styles(&self.road_ratings)
    }

    pub fn road_style(&self, road_id: &str) -> RoadStyle {
        road_style(road_id, &self.road_ratings)
    }

    /// Color of a rated segment (blue if never rated).
    pub fn segment_color(&self, segment_id: &str) -> SafetyColor {
        segment_color(self.segment_ratings.average_rating(segment_id))
    }

    /// Aggregates of every rated segment on a road.
    pub fn segments_of(&self, road_id: &str) -> Vec<&Aggregate> {
        let mut segments: Vec<&Aggregate> = self
            .segment_ratings
            .aggregates()
            .filter(|a| parse_segment_id(&a.target_id).map_or(false, |(road, _, _)| road == road_id))
            .collect();
        segments.sort_by(|a, b| a.target_id.cmp(&b.target_id));
        segments
    }

    // ========================================================================
    // Alerts
    // ========================================================================

    /// Validate an alert and add it to the road's local list.
    ///
    /// Returns the validated alert for background sync.
    pub fn report_alert(&mut self, alert: NewAlert) -> Result<NewAlert> {
        alert.validate()?;
        self.network.road(&alert.road_id).ok_or_unknown_road(&alert.road_id)?;

        let list = self.alerts.entry(alert.road_id.clone()).or_default();
        list.insert(
            0,
            RoadAlert {
                road_id: Some(alert.road_id.clone()),
                alert_type: alert.alert_type,
                description: alert.description.trim().to_string(),
                timestamp: Utc::now(),
            },
        );
        info!(
            "[RoadSafetySession] {} alert on {}",
            alert.alert_type, alert.road_id
        );
        Ok(alert)
    }

    /// Replace a road's alerts with a fetched list.
    pub fn set_alerts(&mut self, road_id: &str, mut alerts: Vec<RoadAlert>) {
        sort_recent_first(&mut alerts);
        self.alerts.insert(road_id.to_string(), alerts);
    }

    /// Known alerts of a road, newest first.
    pub fn alerts(&self, road_id: &str) -> &[RoadAlert] {
        self.alerts.get(road_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            road_count: self.network.len(),
            rated_road_count: self.road_ratings.len(),
            road_rating_count: self.road_ratings.rating_count(),
            rated_segment_count: self.segment_ratings.len(),
            segment_rating_count: self.segment_ratings.rating_count(),
            alert_count: self.alerts.values().map(Vec::len).sum(),
        }
    }
}
