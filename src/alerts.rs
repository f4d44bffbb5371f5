//! Road alerts reported by users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RoadSafetyError, Result};

/// Longest accepted alert description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Kind of reported alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Harassment,
    PoorLighting,
    Accident,
    Construction,
    #[default]
    #[serde(other)]
    Other,
}

impl AlertType {
    /// Human-readable label ("Poor lighting").
    pub fn label(&self) -> &'static str {
        match self {
            AlertType::Harassment => "Harassment",
            AlertType::PoorLighting => "Poor lighting",
            AlertType::Accident => "Accident",
            AlertType::Construction => "Construction",
            AlertType::Other => "Other",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An alert as returned by `GET /api/road-alerts/:roadId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadAlert {
    #[serde(default)]
    pub road_id: Option<String>,
    #[serde(default)]
    pub alert_type: AlertType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/road-alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    pub road_id: String,
    pub alert_type: AlertType,
    pub description: String,
}

impl NewAlert {
    pub fn new(road_id: impl Into<String>, alert_type: AlertType, description: impl Into<String>) -> Self {
        Self {
            road_id: road_id.into(),
            alert_type,
            description: description.into(),
        }
    }

    /// Check required fields; the description is trimmed before measuring.
    pub fn validate(&self) -> Result<()> {
        if self.road_id.trim().is_empty() {
            return Err(RoadSafetyError::validation("roadId", "roadId is required"));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(RoadSafetyError::validation(
                "description",
                "Please provide a description",
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(RoadSafetyError::validation(
                "description",
                format!("Description must be at most {} characters", MAX_DESCRIPTION_LEN),
            ));
        }

        Ok(())
    }
}

/// Sort alerts newest first.
pub fn sort_recent_first(alerts: &mut [RoadAlert]) {
    alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
