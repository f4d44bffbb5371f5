//! End-to-end selection and rating scenarios.
//!
//! Drives a full session the way a map client does: load roads from GeoJSON,
//! click, drag, rate, then read back aggregates and colors.

use road_safety::{
    extract_road_segment, find_closest_point_on_road, linear_position_to_percent, Coordinate,
    DragState, Rating, RatingSubmission, Road, RoadNetwork, RoadSafetyError, RoadSafetySession,
    SafetyColor, SegmentSelector,
};

const ROADS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"osmId": 9, "name": "MG Road"},
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [0.0, 0.001], [0.0, 0.002]]}
        },
        {
            "type": "Feature",
            "properties": {"name": "Service Lane"},
            "geometry": {"type": "LineString", "coordinates": [[0.01, 0.0], [0.01, 0.002]]}
        },
        {
            "type": "Feature",
            "properties": {"osmId": 11, "name": "Stub"},
            "geometry": {"type": "LineString", "coordinates": [[0.02, 0.0]]}
        }
    ]
}"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session() -> RoadSafetySession {
    init_logging();
    let network = RoadNetwork::from_geojson_str(ROADS).expect("sample roads should parse");
    RoadSafetySession::new(network)
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_click_near_first_segment_is_quarter_way() {
    let road = [
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 1.0),
        Coordinate::new(0.0, 2.0),
    ];
    let hit = find_closest_point_on_road(&Coordinate::new(0.0, 0.5), &road).unwrap();

    assert_eq!(hit.segment_index, 0);
    assert!((hit.t - 0.5).abs() < 1e-9);

    let percent = linear_position_to_percent(&road, hit.linear_position).unwrap();
    assert!((percent - 25.0).abs() < 1e-6, "got {}", percent);
}

#[test]
fn test_extracting_a_single_position_is_never_empty() {
    let road = [
        Coordinate::new(0.0, 0.0),
        Coordinate::new(0.0, 1.0),
        Coordinate::new(0.0, 2.0),
    ];
    for pos in [0.0, 0.5, 1.0, 1.5, 2.0] {
        assert!(!extract_road_segment(&road, pos, pos).is_empty(), "pos {}", pos);
    }
}

// ============================================================================
// Drag to segment
// ============================================================================

#[test]
fn test_backwards_drag_yields_ordered_segment_id() {
    let mut session = session();
    session.click_road("way_9").unwrap();

    // 70% -> 30%
    assert!(session.pointer_down(Coordinate::new(0.0, 0.0014)));
    session.pointer_move(Coordinate::new(0.0, 0.0010));
    session.pointer_move(Coordinate::new(0.0, 0.0006));
    let segment = session.pointer_up().expect("drag should commit");

    assert_eq!(segment.segment_id, "way_9_30.00_70.00");
    assert_eq!(segment.road_id, "way_9");
    assert!(segment.is_reversed());

    let (low, high) = segment.percent_range();
    assert!((low - 30.0).abs() < 1e-6);
    assert!((high - 70.0).abs() < 1e-6);

    // Geometry runs in road order and passes through the middle vertex
    let first = segment.geometry.first().unwrap();
    let last = segment.geometry.last().unwrap();
    assert!(first.latitude < last.latitude);
    assert!(segment.geometry.contains(&Coordinate::new(0.0, 0.001)));
}

#[test]
fn test_same_stretch_gets_same_id_in_either_direction() {
    let mut session = session();
    session.click_road("way_9").unwrap();

    session.pointer_down(Coordinate::new(0.0, 0.0006));
    session.pointer_move(Coordinate::new(0.0, 0.0014));
    let forward = session.pointer_up().unwrap();

    session.pointer_down(Coordinate::new(0.0, 0.0014));
    session.pointer_move(Coordinate::new(0.0, 0.0006));
    let backward = session.pointer_up().unwrap();

    assert_eq!(forward.segment_id, backward.segment_id);
}

#[test]
fn test_halfway_percents_round_up_in_segment_id() {
    init_logging();
    let road = Road::new(
        "way_1",
        "Straight",
        vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)],
    );
    let mut selector = SegmentSelector::default();
    selector.select_road(&road);

    assert!(selector.pointer_down("way_1", Coordinate::new(0.0, 0.00125)));
    selector.pointer_move(Coordinate::new(0.0, 0.50625));
    let segment = selector.pointer_up().unwrap();

    assert_eq!(segment.start_percent, 0.125);
    assert_eq!(segment.end_percent, 50.625);
    assert_eq!(segment.segment_id, "way_1_0.13_50.63");
}

#[test]
fn test_click_without_move_commits_nothing() {
    let mut session = session();
    session.click_road("way_9").unwrap();

    assert!(session.pointer_down(Coordinate::new(0.0, 0.0005)));
    assert!(session.pointer_up().is_none());
    assert!(matches!(session.selector().state(), DragState::Idle));
}

#[test]
fn test_cancel_mid_drag() {
    let mut session = session();
    session.click_road("way_9").unwrap();

    session.pointer_down(Coordinate::new(0.0, 0.0002));
    session.pointer_move(Coordinate::new(0.0, 0.0018));
    session.cancel();

    assert!(matches!(session.selector().state(), DragState::Cancelled));
    assert!(session.pointer_up().is_none());
    assert!(session.selector().preview().is_none());

    // A new drag can start after cancelling
    assert!(session.pointer_down(Coordinate::new(0.0, 0.0002)));
}

#[test]
fn test_degenerate_road_cannot_be_segmented() {
    let mut session = session();
    session.click_road("way_11").unwrap();
    assert!(!session.pointer_down(Coordinate::new(0.02, 0.0)));
}

#[test]
fn test_drag_on_other_road_is_ignored() {
    let mut session = session();
    session.click_road("way_9").unwrap();
    assert!(!session.pointer_down(Coordinate::new(0.01, 0.001)));
    assert!(!session.selector().is_dragging());
}

// ============================================================================
// Ratings
// ============================================================================

#[test]
fn test_two_road_ratings_average_to_four() {
    let mut session = session();
    session.submit_road_rating(RatingSubmission::new("way_9", 3.0)).unwrap();
    session.submit_road_rating(RatingSubmission::new("way_9", 5.0)).unwrap();

    let aggregate = session.road_ratings().aggregate("way_9").unwrap();
    assert_eq!(aggregate.total_reviews, 2);
    assert_eq!(aggregate.average_rating, 4.0);
}

#[test]
fn test_out_of_range_rating_is_rejected() {
    let mut session = session();
    let err = session
        .submit_road_rating(RatingSubmission::new("way_9", 6.0))
        .unwrap_err();

    assert!(matches!(err, RoadSafetyError::Validation { .. }));
    assert!(session.road_ratings().aggregate("way_9").is_none());
    assert_eq!(session.road_style("way_9").color, SafetyColor::Blue);
}

#[test]
fn test_never_rated_road_is_blue() {
    let session = session();
    assert!(session.road_ratings().aggregate("road_1").is_none());
    let styles = session.road_styles();
    assert!(styles.iter().all(|s| s.color == SafetyColor::Blue && s.total_reviews == 0));
}

#[test]
fn test_rate_dragged_segment() {
    let mut session = session();
    session.click_road("way_9").unwrap();
    session.pointer_down(Coordinate::new(0.0, 0.0002));
    session.pointer_move(Coordinate::new(0.0, 0.0008));
    let segment = session.pointer_up().unwrap();

    let rating = Rating {
        lighting: Some(4.0),
        crowd: Some(3.0),
        ..Rating::overall(4.0)
    };
    session
        .submit_segment_rating(&segment.segment_id, rating)
        .unwrap();
    session
        .submit_segment_rating(&segment.segment_id, Rating::overall(2.0))
        .unwrap();

    let aggregate = session.segment_ratings().aggregate(&segment.segment_id).unwrap();
    assert_eq!(aggregate.total_reviews, 2);
    assert_eq!(aggregate.average_rating, 3.0);
    assert_eq!(aggregate.lighting_average, 4.0);

    assert_eq!(session.segment_color(&segment.segment_id), SafetyColor::Orange);
    // Rating a segment ends the segment selection
    assert!(matches!(session.selector().state(), DragState::Cancelled));
    // Segment ratings never touch the road store
    assert!(session.road_ratings().is_empty());
}
