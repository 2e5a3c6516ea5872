//! Vertex reduction for client-side rendering.

use geo::{Area, Geometry, LineString, MultiPolygon, Polygon, Simplify};
use log::debug;

use crate::feature::{geometry_to_geojson, parse_geometry, FeatureCollection};

/// Default tolerance in degrees (roughly 100 m at Ceará's latitude).
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Simplify every polygonal geometry with Douglas-Peucker at `tolerance` degrees.
///
/// Properties are untouched. Geometries that are not polygons, fail to parse,
/// or would collapse (fewer than four ring coordinates, zero area) are kept as
/// they were.
pub fn simplify(mut collection: FeatureCollection, tolerance: f64) -> FeatureCollection {
    if collection.is_empty() || !tolerance.is_finite() || tolerance <= 0.0 {
        return collection;
    }

    let mut skipped = 0usize;
    for feature in collection.features.iter_mut() {
        let Some(raw) = feature.geometry.as_ref() else { continue };
        let simplified = match parse_geometry(raw) {
            Ok(Geometry::Polygon(p)) => Geometry::Polygon(simplify_polygon(&p, tolerance)),
            Ok(Geometry::MultiPolygon(mp)) => Geometry::MultiPolygon(simplify_multipolygon(&mp, tolerance)),
            _ => { skipped += 1; continue }
        };
        feature.geometry = geometry_to_geojson(&simplified);
    }

    if skipped > 0 {
        debug!("[simplify] left {skipped} non-polygonal or unreadable geometries unchanged");
    }
    collection
}

/// Simplify a MultiPolygon using Douglas-Peucker algorithm.
fn simplify_multipolygon(mp: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    MultiPolygon(mp.0.iter().map(|poly| simplify_polygon(poly, tolerance)).collect())
}

/// Simplify a polygon's rings, keeping the original wherever a ring would degenerate.
fn simplify_polygon(poly: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let exterior = poly.exterior().simplify(&tolerance);
    if is_degenerate(&exterior) {
        return poly.clone();
    }

    let interiors = poly.interiors().iter()
        .map(|ring| {
            let simplified = ring.simplify(&tolerance);
            if is_degenerate(&simplified) { ring.clone() } else { simplified }
        })
        .collect();

    Polygon::new(exterior, interiors)
}

/// A closed ring needs four coordinates and a non-zero area.
fn is_degenerate(ring: &LineString<f64>) -> bool {
    ring.0.len() < 4 || Polygon::new(ring.clone(), Vec::new()).unsigned_area() == 0.0
}
