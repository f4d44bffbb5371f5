//! In-memory rating store.

use std::collections::HashMap;

use log::{debug, info};

use super::{Aggregate, Rating, RoadRatingSummary};

/// Ratings and aggregates keyed by target id.
///
/// The two maps are private: the only writers are [`RatingStore::add_rating`]
/// and [`RatingStore::replace_all`], which keep every aggregate equal to a
/// full recomputation over its rating list.
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    ratings: HashMap<String, Vec<Rating>>,
    aggregates: HashMap<String, Aggregate>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rating to a target and recompute its aggregate.
    pub fn add_rating(&mut self, target_id: &str, rating: Rating) -> Option<&Aggregate> {
        self.ratings
            .entry(target_id.to_string())
            .or_default()
            .push(rating);
        self.compute_aggregate(target_id)
    }

    /// Recompute the aggregate of a target from its full rating list.
    ///
    /// A target without ratings has its aggregate removed, so "never rated"
    /// stays distinguishable from a zero score.
    pub fn compute_aggregate(&mut self, target_id: &str) -> Option<&Aggregate> {
        let ratings = self.ratings.get(target_id).map(Vec::as_slice).unwrap_or(&[]);

        match Aggregate::from_ratings(target_id, ratings) {
            Some(aggregate) => {
                debug!(
                    "[RatingStore] {}: {} reviews, avg {:.2}",
                    target_id, aggregate.total_reviews, aggregate.average_rating
                );
                self.aggregates.insert(target_id.to_string(), aggregate);
                self.aggregates.get(target_id)
            }
            None => {
                self.aggregates.remove(target_id);
                None
            }
        }
    }

    /// Replace the whole store with server-provided summaries.
    ///
    /// Aggregates are recomputed from each summary's rating list rather than
    /// copied, so they follow the same rules as locally added ratings.
    pub fn replace_all(&mut self, summaries: impl IntoIterator<Item = RoadRatingSummary>) {
        self.clear();

        for summary in summaries {
            if summary.ratings.is_empty() {
                continue;
            }
            let road_id = summary.road_id;
            self.ratings.insert(road_id.clone(), summary.ratings);
            self.compute_aggregate(&road_id);
        }

        info!(
            "[RatingStore] Loaded ratings for {} targets",
            self.aggregates.len()
        );
    }

    pub fn aggregate(&self, target_id: &str) -> Option<&Aggregate> {
        self.aggregates.get(target_id)
    }

    /// Mean overall score of a target, `None` if it was never rated.
    pub fn average_rating(&self, target_id: &str) -> Option<f64> {
        self.aggregates.get(target_id).map(|a| a.average_rating)
    }

    /// All ratings of a target in insertion order (empty if none).
    pub fn ratings(&self, target_id: &str) -> &[Rating] {
        self.ratings.get(target_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over every rated target's aggregate.
    pub fn aggregates(&self) -> impl Iterator<Item = &Aggregate> {
        self.aggregates.values()
    }

    /// Number of rated targets.
    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }

    /// Total number of stored ratings across all targets.
    pub fn rating_count(&self) -> usize {
        self.ratings.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.ratings.clear();
        self.aggregates.clear();
    }
}
