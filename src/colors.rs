//! Safety color mapping for the map layer.
//!
//! Segments and whole roads use different thresholds. Roads only turn green
//! at a perfect 5.0 and are orange for everything from 1.0 up, while segments
//! use the 4.0 / 3.0 split. The two functions are kept separate on purpose.

use serde::{Deserialize, Serialize};

/// Color bucket for an average rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyColor {
    /// Unrated
    Blue,
    /// Safe
    Green,
    /// Moderate
    Orange,
    /// Unsafe
    Red,
}

impl SafetyColor {
    /// CSS hex color used by the map layer.
    pub fn hex(&self) -> &'static str {
        match self {
            SafetyColor::Blue => "#3b82f6",
            SafetyColor::Green => "#10b981",
            SafetyColor::Orange => "#f59e0b",
            SafetyColor::Red => "#ef4444",
        }
    }
}

fn is_unrated(avg_rating: Option<f64>) -> bool {
    match avg_rating {
        None => true,
        Some(r) => r == 0.0 || r.is_nan(),
    }
}

/// Color of a rated segment: green from 4.0, orange from 3.0, red below.
pub fn segment_color(avg_rating: Option<f64>) -> SafetyColor {
    if is_unrated(avg_rating) {
        return SafetyColor::Blue;
    }
    match avg_rating.unwrap_or_default() {
        r if r >= 4.0 => SafetyColor::Green,
        r if r >= 3.0 => SafetyColor::Orange,
        _ => SafetyColor::Red,
    }
}

/// Color of a whole road: green at 5.0, orange from 1.0, red below.
pub fn road_color(avg_rating: Option<f64>) -> SafetyColor {
    if is_unrated(avg_rating) {
        return SafetyColor::Blue;
    }
    match avg_rating.unwrap_or_default() {
        r if r >= 5.0 => SafetyColor::Green,
        r if r >= 1.0 => SafetyColor::Orange,
        _ => SafetyColor::Red,
    }
}

/// Five-character star string for an average rating.
///
/// Whole stars for the integer part plus one more when the fraction is at
/// least one half; unrated shows five empty stars.
pub fn render_stars(rating: Option<f64>) -> String {
    let Some(rating) = rating.filter(|r| *r > 0.0 && r.is_finite()) else {
        return "☆☆☆☆☆".to_string();
    };

    let rating = rating.min(5.0);
    let full = rating.floor() as usize;
    let half = rating.fract() >= 0.5;
    let filled = full + usize::from(half);

    "⭐".repeat(filled) + &"☆".repeat(5usize.saturating_sub(filled))
}
