//! `GeoJSON` overlays of a calculation for map frontends.
//!
//! Coordinates are emitted exactly as the request supplied them (planar
//! meters or `[lng, lat]`), so a map client can draw the overlay on the same
//! layer it took the boundary from.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use site_planner_geometry::Polygon;
use site_planner_setback_models::{BuildableAreaRequest, BuildableAreaResult};

/// Site polygon, buildable polygon (when one exists), and one line feature
/// per boundary edge carrying its role and applied setback.
#[must_use]
pub fn feature_collection(
    request: &BuildableAreaRequest,
    result: &BuildableAreaResult,
) -> FeatureCollection {
    let mut features = Vec::new();

    // Site layers are skipped for a boundary the engine would reject
    let site = Polygon::from_coords(&request.site_coords).ok();

    if let Some(site) = &site {
        features.push(feature(
            Value::from(&site.to_geo()),
            properties(json!({
                "kind": "site",
                "area_m2": result.site_area_m2,
            })),
        ));
    }

    if let Ok(buildable) = Polygon::from_coords(&result.buildable_coords) {
        features.push(feature(
            Value::from(&buildable.to_geo()),
            properties(json!({
                "kind": "buildable",
                "area_m2": result.buildable_area_m2,
                "coverage_ratio": result.coverage_ratio,
                "calculation_method": result.calculation_method,
            })),
        ));
    }

    if let Some(site) = &site {
        for (index, edge) in site.edges().enumerate() {
            let Some(detail) = result.setback_details.get(&index) else {
                continue;
            };
            features.push(feature(
                Value::LineString(vec![
                    vec![edge.start.x, edge.start.y],
                    vec![edge.end.x, edge.end.y],
                ]),
                properties(json!({
                    "kind": "edge",
                    "edge_index": index,
                    "role": detail.role,
                    "setback_m": detail.distance_m,
                    "side_fallback": detail.side_fallback,
                })),
            ));
        }
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
