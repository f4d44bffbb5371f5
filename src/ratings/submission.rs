//! Rating submissions and boundary validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Rating, MAX_SCORE, MIN_SCORE};
use crate::error::{RoadSafetyError, Result};

/// Body of `POST /api/road-ratings`.
///
/// A submission must pass [`RatingSubmission::validate`] before it is applied
/// to any store, so rejected input never shows up in an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    pub road_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_street_lights: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_population_density: Option<bool>,
    #[serde(rename = "hasCCTV", default, skip_serializing_if = "Option::is_none")]
    pub has_cctv: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl RatingSubmission {
    /// A submission with a single overall score.
    pub fn new(road_id: impl Into<String>, rating: f64) -> Self {
        Self {
            road_id: road_id.into(),
            rating: Some(rating),
            ..Self::default()
        }
    }

    /// Build a submission from separate day and night scores.
    ///
    /// At least one score is required. The overall rating is the mean of both
    /// when both are given, otherwise whichever one is present.
    pub fn from_day_night(
        road_id: impl Into<String>,
        day_rating: Option<f64>,
        night_rating: Option<f64>,
    ) -> Result<Self> {
        let rating = match (day_rating, night_rating) {
            (Some(day), Some(night)) => (day + night) / 2.0,
            (Some(score), None) | (None, Some(score)) => score,
            (None, None) => {
                return Err(RoadSafetyError::validation(
                    "rating",
                    "Please provide at least one rating (day or night)",
                ))
            }
        };

        Ok(Self {
            road_id: road_id.into(),
            rating: Some(rating),
            day_rating,
            night_rating,
            ..Self::default()
        })
    }

    pub fn with_road_name(mut self, name: impl Into<String>) -> Self {
        self.road_name = Some(name.into());
        self
    }

    pub fn with_street_lights(mut self, present: bool) -> Self {
        self.has_street_lights = Some(present);
        self
    }

    pub fn with_population_density(mut self, present: bool) -> Self {
        self.has_population_density = Some(present);
        self
    }

    pub fn with_cctv(mut self, present: bool) -> Self {
        self.has_cctv = Some(present);
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// Check required fields and score ranges.
    pub fn validate(&self) -> Result<()> {
        if self.road_id.trim().is_empty() {
            return Err(RoadSafetyError::validation(
                "roadId",
                "roadId and rating are required",
            ));
        }

        match self.rating {
            None => {
                return Err(RoadSafetyError::validation(
                    "rating",
                    "roadId and rating are required",
                ))
            }
            Some(score) => validate_score("rating", score)?,
        }

        if let Some(day) = self.day_rating {
            validate_score("dayRating", day)?;
        }
        if let Some(night) = self.night_rating {
            validate_score("nightRating", night)?;
        }

        Ok(())
    }

    /// The record stored locally for this submission.
    pub fn to_rating(&self, timestamp: DateTime<Utc>) -> Rating {
        Rating {
            rating: self.rating,
            day_rating: self.day_rating,
            night_rating: self.night_rating,
            has_street_lights: self.has_street_lights,
            has_population_density: self.has_population_density,
            has_cctv: self.has_cctv,
            comments: self.comments.clone(),
            timestamp: Some(timestamp),
            ..Rating::default()
        }
    }
}

/// Validate a single 1-5 score.
pub(crate) fn validate_score(field: &str, score: f64) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(RoadSafetyError::validation(
            field,
            format!("Rating must be between {} and {}", MIN_SCORE, MAX_SCORE),
        ));
    }
    Ok(())
}

impl Rating {
    /// Check that every score present on the rating is within 1-5.
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("rating", self.rating),
            ("dayRating", self.day_rating),
            ("nightRating", self.night_rating),
            ("lighting", self.lighting),
            ("crowd", self.crowd),
            ("visibility", self.visibility),
            ("roadCondition", self.road_condition),
        ];
        for (field, score) in scores {
            if let Some(score) = score {
                validate_score(field, score)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        assert!(RatingSubmission::new("way_1", 3.0).validate().is_ok());
        assert!(RatingSubmission::new("way_1", 1.0).validate().is_ok());
        assert!(RatingSubmission::new("way_1", 5.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        for score in [6.0, 0.0, -1.0, 5.5, f64::NAN] {
            let err = RatingSubmission::new("way_1", score).validate().unwrap_err();
            assert!(
                matches!(err, RoadSafetyError::Validation { ref field, .. } if field == "rating"),
                "score {}",
                score
            );
        }
    }

    #[test]
    fn test_rejects_missing_fields() {
        let missing_road = RatingSubmission::new("", 3.0);
        assert!(matches!(
            missing_road.validate(),
            Err(RoadSafetyError::Validation { ref field, .. }) if field == "roadId"
        ));

        let missing_rating = RatingSubmission {
            road_id: "way_1".to_string(),
            ..RatingSubmission::default()
        };
        assert!(missing_rating.validate().is_err());
    }

    #[test]
    fn test_day_night_overall() {
        let both = RatingSubmission::from_day_night("way_1", Some(4.0), Some(2.0)).unwrap();
        assert_eq!(both.rating, Some(3.0));

        let night_only = RatingSubmission::from_day_night("way_1", None, Some(5.0)).unwrap();
        assert_eq!(night_only.rating, Some(5.0));
        assert_eq!(night_only.day_rating, None);

        assert!(RatingSubmission::from_day_night("way_1", None, None).is_err());
    }

    #[test]
    fn test_bad_day_score_is_rejected() {
        let submission = RatingSubmission::from_day_night("way_1", Some(9.0), Some(1.0)).unwrap();
        assert!(matches!(
            submission.validate(),
            Err(RoadSafetyError::Validation { ref field, .. }) if field == "dayRating"
        ));
    }

    #[test]
    fn test_wire_body() {
        let body = RatingSubmission::new("way_1", 4.0)
            .with_road_name("Eluru Road")
            .with_cctv(false)
            .with_comments("busy at night");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["roadId"], "way_1");
        assert_eq!(json["roadName"], "Eluru Road");
        assert_eq!(json["rating"], 4.0);
        assert_eq!(json["hasCCTV"], false);
        assert!(json.get("dayRating").is_none());
    }

    #[test]
    fn test_to_rating() {
        let now = Utc::now();
        let rating = RatingSubmission::new("way_1", 2.0)
            .with_street_lights(true)
            .with_population_density(false)
            .to_rating(now);
        assert_eq!(rating.rating, Some(2.0));
        assert_eq!(rating.has_street_lights, Some(true));
        assert_eq!(rating.has_population_density, Some(false));
        assert_eq!(rating.timestamp, Some(now));
    }

    #[test]
    fn test_rating_validate() {
        assert!(Rating::overall(4.0).validate().is_ok());
        let bad = Rating {
            visibility: Some(0.5),
            ..Rating::default()
        };
        assert!(bad.validate().is_err());
    }
}
