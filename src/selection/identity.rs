//! Deterministic segment identifiers.
//!
//! A segment id is `"{road_id}_{min}_{max}"` with both percentages printed to
//! exactly two decimals. Rounding to two decimals is what makes repeated
//! drags over the same stretch land on the same id, so ratings accumulate on
//! one segment instead of many near-duplicates.

/// Generate the id of the segment between two percent positions on a road.
///
/// The bounds are ordered first, so the id does not depend on drag direction.
///
/// # Example
/// ```
/// use road_safety::generate_segment_id;
///
/// assert_eq!(generate_segment_id("way_9", 70.0, 30.0), "way_9_30.00_70.00");
/// assert_eq!(
///     generate_segment_id("way_9", 30.0, 70.0),
///     generate_segment_id("way_9", 70.0, 30.0),
/// );
/// ```
pub fn generate_segment_id(road_id: &str, start_percent: f64, end_percent: f64) -> String {
    let (lo, hi) = if start_percent < end_percent {
        (start_percent, end_percent)
    } else {
        (end_percent, start_percent)
    };

    format!("{}_{}_{}", road_id, to_fixed_2(lo), to_fixed_2(hi))
}

/// Print with exactly two decimals, rounding exact ties away from zero.
///
/// `{:.2}` rounds a value that sits exactly halfway (0.125) to even. A
/// two-decimal tie is an odd multiple of 1/8, which is exact in binary, so
/// those are detected and rounded up in magnitude instead.
fn to_fixed_2(value: f64) -> String {
    // Adding zero folds -0.0 into 0.0 so it never prints as "-0.00"
    let value = value + 0.0;
    let eighths = value * 8.0;
    let is_tie = eighths.fract() == 0.0 && eighths % 2.0 != 0.0;

    if is_tie {
        let cents = (value * 100.0).abs().ceil().copysign(value);
        format!("{:.2}", cents / 100.0)
    } else {
        format!("{:.2}", value)
    }
}

/// Split a segment id back into `(road_id, start_percent, end_percent)`.
///
/// Road ids may contain underscores themselves (`way_123`), so the two
/// percentages are taken from the right.
pub fn parse_segment_id(segment_id: &str) -> Option<(&str, f64, f64)> {
    let mut parts = segment_id.rsplitn(3, '_');
    let end: f64 = parts.next()?.parse().ok()?;
    let start: f64 = parts.next()?.parse().ok()?;
    let road_id = parts.next()?;

    if road_id.is_empty() || start > end {
        return None;
    }

    Some((road_id, start, end))
}
