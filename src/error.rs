//! Unified error handling for the road-safety library.
//!
//! Every fallible operation returns [`RoadSafetyError`]. "Nothing found" is
//! never an error here: lookups that can come up empty return `Option` or an
//! empty `Vec` instead.

use thiserror::Error;

/// Unified error type for road-safety operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoadSafetyError {
    /// A submitted field is missing or out of range
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Road geometry cannot be measured (single vertex or zero length)
    #[error("Road '{road_id}' has degenerate geometry: {message}")]
    DegenerateGeometry { road_id: String, message: String },

    /// Road network input could not be parsed
    #[error("Invalid GeoJSON: {message}")]
    InvalidGeoJson { message: String },

    /// The road is not part of the loaded network
    #[error("Unknown road '{road_id}'")]
    UnknownRoad { road_id: String },

    /// HTTP/API error
    #[error("{}", format_network(.message, .status_code))]
    Network {
        message: String,
        status_code: Option<u16>,
    },
}

fn format_network(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("Network error ({}): {}", code, message),
        None => format!("Network error: {}", message),
    }
}

impl RoadSafetyError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        RoadSafetyError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Attach the road id to a geometry error raised on bare coordinates.
    pub(crate) fn with_road_id(self, id: &str) -> Self {
        match self {
            RoadSafetyError::DegenerateGeometry { road_id, message } if road_id.is_empty() => {
                RoadSafetyError::DegenerateGeometry {
                    road_id: id.to_string(),
                    message,
                }
            }
            other => other,
        }
    }

    /// Whether the error came from the network layer.
    ///
    /// Network failures only ever affect notifications; local state is kept.
    pub fn is_network(&self) -> bool {
        matches!(self, RoadSafetyError::Network { .. })
    }
}

/// Result type alias for road-safety operations.
pub type Result<T> = std::result::Result<T, RoadSafetyError>;

/// Extension trait for converting Option to RoadSafetyError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an unknown road error.
    fn ok_or_unknown_road(self, road_id: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_unknown_road(self, road_id: &str) -> Result<T> {
        self.ok_or_else(|| RoadSafetyError::UnknownRoad {
            road_id: road_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RoadSafetyError::DegenerateGeometry {
            road_id: "way_1".to_string(),
            message: "road has 1 point".to_string(),
        };
        assert!(err.to_string().contains("way_1"));
        assert!(err.to_string().contains("1 point"));

        let err = RoadSafetyError::Network {
            message: "connection refused".to_string(),
            status_code: Some(500),
        };
        assert_eq!(err.to_string(), "Network error (500): connection refused");
        assert!(err.is_network());
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_unknown_road("way_7");
        assert!(matches!(result, Err(RoadSafetyError::UnknownRoad { .. })));

        assert_eq!(Some(3).ok_or_unknown_road("way_7"), Ok(3));
    }

    #[test]
    fn test_with_road_id() {
        let bare = RoadSafetyError::DegenerateGeometry {
            road_id: String::new(),
            message: "road of 2 points has zero length".to_string(),
        };
        let err = bare.with_road_id("way_4");
        assert!(err.to_string().starts_with("Road 'way_4' has degenerate geometry"));

        // An id that is already set is kept
        assert_eq!(
            err.clone().with_road_id("way_5"),
            err
        );

        let other = RoadSafetyError::UnknownRoad { road_id: "way_1".to_string() };
        assert_eq!(other.clone().with_road_id("way_2"), other);
    }
}
