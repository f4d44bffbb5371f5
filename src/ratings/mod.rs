//! # Ratings
//!
//! Rating records, their per-target aggregates, and the in-memory store that
//! keeps both in sync.
//!
//! A target is either a road (`way_123`) or a segment id
//! (`way_123_10.00_40.00`); the store does not care which.

mod store;
mod submission;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use store::RatingStore;
pub use submission::RatingSubmission;

/// Lowest accepted score.
pub const MIN_SCORE: f64 = 1.0;
/// Highest accepted score.
pub const MAX_SCORE: f64 = 5.0;

/// A single safety rating. Never modified once stored.
///
/// Every numeric field is optional: road ratings carry `rating` plus
/// day/night scores, segment ratings may carry the detailed sub-scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rating {
    /// Overall score (1-5)
    pub rating: Option<f64>,
    pub day_rating: Option<f64>,
    pub night_rating: Option<f64>,
    pub lighting: Option<f64>,
    pub crowd: Option<f64>,
    pub visibility: Option<f64>,
    pub road_condition: Option<f64>,
    pub has_street_lights: Option<bool>,
    pub has_population_density: Option<bool>,
    #[serde(rename = "hasCCTV")]
    pub has_cctv: Option<bool>,
    pub comments: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Rating {
    /// A rating with only an overall score, stamped now.
    pub fn overall(score: f64) -> Self {
        Self {
            rating: Some(score),
            timestamp: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Day score to display: the day rating, or the overall score for
    /// records that predate separate day/night ratings.
    pub fn display_day(&self) -> Option<f64> {
        if self.day_rating.is_some() || self.night_rating.is_some() {
            self.day_rating
        } else {
            self.rating
        }
    }

    /// Night score to display, with the same fallback as [`Rating::display_day`].
    pub fn display_night(&self) -> Option<f64> {
        if self.day_rating.is_some() || self.night_rating.is_some() {
            self.night_rating
        } else {
            self.rating
        }
    }
}

/// Summary of all ratings of one target.
///
/// Absent from the store for a target that has never been rated; a present
/// aggregate always has `total_reviews >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub target_id: String,
    pub total_reviews: usize,
    /// Mean overall score (0 if no rating carries one)
    pub average_rating: f64,
    pub day_average: f64,
    pub night_average: f64,
    /// Number of ratings with a day score
    pub day_count: usize,
    /// Number of ratings with a night score
    pub night_count: usize,
    pub lighting_average: f64,
    pub crowd_average: f64,
    pub visibility_average: f64,
    pub road_condition_average: f64,
}

impl Aggregate {
    /// Build the aggregate of a non-empty rating list.
    ///
    /// Each mean ignores ratings where the field is missing; a field missing
    /// from every rating averages to 0.
    pub(crate) fn from_ratings(target_id: &str, ratings: &[Rating]) -> Option<Self> {
        if ratings.is_empty() {
            return None;
        }

        let mean_of = |field: fn(&Rating) -> Option<f64>| average(ratings.iter().filter_map(field));
        let count_of =
            |field: fn(&Rating) -> Option<f64>| ratings.iter().filter_map(field).count();

        Some(Self {
            target_id: target_id.to_string(),
            total_reviews: ratings.len(),
            average_rating: mean_of(|r| r.rating),
            day_average: mean_of(|r| r.day_rating),
            night_average: mean_of(|r| r.night_rating),
            day_count: count_of(|r| r.day_rating),
            night_count: count_of(|r| r.night_rating),
            lighting_average: mean_of(|r| r.lighting),
            crowd_average: mean_of(|r| r.crowd),
            visibility_average: mean_of(|r| r.visibility),
            road_condition_average: mean_of(|r| r.road_condition),
        })
    }
}

/// Arithmetic mean; an empty sequence averages to 0.
pub fn average(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Per-road entry of `GET /api/road-ratings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadRatingSummary {
    pub road_id: String,
    #[serde(default)]
    pub road_name: Option<String>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    #[serde(default)]
    pub total_reviews: usize,
    #[serde(default)]
    pub average_rating: f64,
}
