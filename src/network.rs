//! # Road Network
//!
//! Roads loaded from a GeoJSON `FeatureCollection` of `LineString`s.
//!
//! Each feature gets a synthetic road id at load time: `way_<osmId>` when the
//! feature carries an OSM id (`properties.osmId`, `properties.id`,
//! `properties["@id"]` or the feature `id`, first present wins), otherwise
//! `road_<index>`. That id is the join key for every rating and alert lookup
//! and stays fixed for the session.

use std::collections::HashMap;

use log::{debug, info, warn};
use rstar::{RTree, AABB};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::colors::{road_color, SafetyColor};
use crate::error::{RoadSafetyError, Result};
use crate::geo_utils::{distance, meters_per_degree};
use crate::projection::{find_closest_point_on_road, RoadProjection};
use crate::ratings::RatingStore;
use crate::{Bounds, Coordinate, Road, RoadEnvelope};

/// Display name for features without a `name` property.
pub const UNNAMED_ROAD: &str = "Unnamed Road";

// ============================================================================
// GeoJSON Input
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Road data extracted from one feature, before length/bounds are computed.
struct RawRoad {
    road_id: String,
    name: String,
    coordinates: Vec<Coordinate>,
}

/// An id value counts only if it is a non-empty string, a non-zero number
/// or `true`.
fn id_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().map_or(true, |f| f != 0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn assign_road_id(feature: &Feature, index: usize) -> String {
    let from_properties = feature.properties.as_ref().and_then(|props| {
        ["osmId", "id", "@id"]
            .iter()
            .find_map(|key| props.get(*key).and_then(id_value_to_string))
    });

    match from_properties.or_else(|| feature.id.as_ref().and_then(id_value_to_string)) {
        Some(osm_id) => format!("way_{}", osm_id),
        None => format!("road_{}", index),
    }
}

fn parse_line_coordinates(value: Value) -> Result<Vec<Coordinate>> {
    // Positions may carry a third (elevation) value, which is dropped
    let positions: Vec<Vec<f64>> =
        serde_json::from_value(value).map_err(|e| RoadSafetyError::InvalidGeoJson {
            message: format!("bad LineString coordinates: {}", e),
        })?;

    positions
        .into_iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lon, *lat)),
            _ => Err(RoadSafetyError::InvalidGeoJson {
                message: format!("position with {} values", p.len()),
            }),
        })
        .collect()
}

/// Roads from every usable feature. Non-LineString features and lines with
/// malformed coordinates are skipped so one bad feature never blocks a load.
fn extract_roads(collection: FeatureCollection) -> Vec<RawRoad> {
    let mut raw = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;
    let mut malformed = 0usize;

    for (index, mut feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry.take() else {
            skipped += 1;
            continue;
        };
        if geometry.kind != "LineString" {
            skipped += 1;
            continue;
        }

        let road_id = assign_road_id(&feature, index);
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNNAMED_ROAD)
            .to_string();

        let coordinates = match parse_line_coordinates(geometry.coordinates) {
            Ok(coordinates) => coordinates,
            Err(e) => {
                warn!("[RoadNetwork] Skipping road {}: {}", road_id, e);
                malformed += 1;
                continue;
            }
        };

        raw.push(RawRoad {
            road_id,
            name,
            coordinates,
        });
    }

    if skipped > 0 {
        debug!("[RoadNetwork] Skipped {} non-LineString features", skipped);
    }
    if malformed > 0 {
        warn!("[RoadNetwork] Skipped {} malformed LineString features", malformed);
    }
    raw
}

#[cfg(feature = "parallel")]
fn build_roads(raw: Vec<RawRoad>) -> Vec<Road> {
    raw.into_par_iter()
        .map(|r| Road::new(r.road_id, r.name, r.coordinates))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_roads(raw: Vec<RawRoad>) -> Vec<Road> {
    raw.into_iter()
        .map(|r| Road::new(r.road_id, r.name, r.coordinates))
        .collect()
}

// ============================================================================
// Road Network
// ============================================================================

/// Rendering properties of one road, derived from its ratings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadStyle {
    pub road_id: String,
    /// Average rating, 0 when the road has never been rated
    pub avg_rating: f64,
    pub total_reviews: usize,
    pub color: SafetyColor,
    /// CSS color for the line layer
    pub color_hex: &'static str,
}

/// All roads of a session with a spatial index for pointer hit testing.
#[derive(Debug)]
pub struct RoadNetwork {
    roads: Vec<Road>,
    by_id: HashMap<String, usize>,
    spatial_index: RTree<RoadEnvelope>,
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RoadNetwork {
    /// Build a network from already constructed roads.
    ///
    /// When two roads share an id the first one is used for id lookups.
    pub fn new(roads: Vec<Road>) -> Self {
        let mut by_id = HashMap::with_capacity(roads.len());
        for (i, road) in roads.iter().enumerate() {
            if by_id.contains_key(road.road_id()) {
                warn!("[RoadNetwork] Duplicate road id {}", road.road_id());
                continue;
            }
            by_id.insert(road.road_id().to_string(), i);
        }

        let envelopes: Vec<RoadEnvelope> = roads
            .iter()
            .enumerate()
            .filter_map(|(i, road)| road.envelope_entry(i))
            .collect();

        Self {
            roads,
            by_id,
            spatial_index: RTree::bulk_load(envelopes),
        }
    }

    /// Load roads from a GeoJSON string.
    pub fn from_geojson_str(geojson: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_str(geojson).map_err(|e| RoadSafetyError::InvalidGeoJson {
                message: e.to_string(),
            })?;
        Ok(Self::from_collection(collection))
    }

    /// Load roads from a parsed GeoJSON value.
    pub fn from_geojson_value(geojson: Value) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_value(geojson).map_err(|e| RoadSafetyError::InvalidGeoJson {
                message: e.to_string(),
            })?;
        Ok(Self::from_collection(collection))
    }

    fn from_collection(collection: FeatureCollection) -> Self {
        let roads = build_roads(extract_roads(collection));
        info!("[RoadNetwork] Loaded {} roads", roads.len());
        Self::new(roads)
    }

    pub fn road(&self, road_id: &str) -> Option<&Road> {
        self.by_id.get(road_id).map(|&i| &self.roads[i])
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Roads whose bounding box intersects the viewport.
    pub fn query_viewport(&self, bounds: &Bounds) -> Vec<&Road> {
        let envelope = AABB::from_corners(
            [bounds.min_lng, bounds.min_lat],
            [bounds.max_lng, bounds.max_lat],
        );
        self.spatial_index
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| &self.roads[entry.index])
            .collect()
    }

    /// The road closest to `point`, if one lies within `tolerance_m` meters.
    pub fn road_at(&self, point: &Coordinate, tolerance_m: f64) -> Option<(&Road, RoadProjection)> {
        let (per_lat, per_lng) = meters_per_degree(point.latitude);
        let margin_lat = tolerance_m / per_lat;
        let margin_lng = if per_lng > 0.0 { tolerance_m / per_lng } else { 180.0 };

        let search = AABB::from_corners(
            [point.longitude - margin_lng, point.latitude - margin_lat],
            [point.longitude + margin_lng, point.latitude + margin_lat],
        );

        let mut best: Option<(&Road, RoadProjection)> = None;
        for entry in self.spatial_index.locate_in_envelope_intersecting(&search) {
            let road = &self.roads[entry.index];
            let Some(hit) = project_onto(road, point) else {
                continue;
            };
            if hit.distance > tolerance_m {
                continue;
            }
            if best.as_ref().map_or(true, |(_, b)| hit.distance < b.distance) {
                best = Some((road, hit));
            }
        }
        best
    }

    /// Style properties of every road for the map layer.
    pub fn styles(&self, ratings: &RatingStore) -> Vec<RoadStyle> {
        self.roads
            .iter()
            .map(|road| road_style(road.road_id(), ratings))
            .collect()
    }
}

/// Style of one road from the road-level rating store.
pub fn road_style(road_id: &str, ratings: &RatingStore) -> RoadStyle {
    let (avg_rating, total_reviews) = ratings
        .aggregate(road_id)
        .map(|a| (a.average_rating, a.total_reviews))
        .unwrap_or((0.0, 0));

    let color = road_color(ratings.average_rating(road_id));
    RoadStyle {
        road_id: road_id.to_string(),
        avg_rating,
        total_reviews,
        color,
        color_hex: color.hex(),
    }
}

/// Project a point onto a road, treating single-vertex roads as a point.
fn project_onto(road: &Road, point: &Coordinate) -> Option<RoadProjection> {
    match road.coordinates() {
        [] => None,
        [only] => Some(RoadProjection {
            point: *only,
            segment_index: 0,
            t: 0.0,
            linear_position: 0.0,
            distance: distance(point, only),
        }),
        coords => find_closest_point_on_road(point, coords),
    }
}
