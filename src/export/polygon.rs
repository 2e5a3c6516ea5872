use geo::{Coord, LineString, MultiPolygon};
use shapefile as shp;

/// Convert a geo MultiPolygon into a shapefile Polygon.
///
/// Rings are laid out the way shapefiles expect: each exterior (clockwise)
/// followed by its holes (counter-clockwise), every ring explicitly closed.
pub(crate) fn to_shp_polygon(mp: &MultiPolygon<f64>) -> shp::Polygon {
    let mut rings = Vec::new();

    for poly in &mp.0 {
        let mut exterior = ring_points(poly.exterior());
        if signed_area(&exterior) > 0.0 {
            exterior.reverse();
        }
        rings.push(shp::PolygonRing::Outer(exterior));

        for hole in poly.interiors() {
            let mut points = ring_points(hole);
            if signed_area(&points) < 0.0 {
                points.reverse();
            }
            rings.push(shp::PolygonRing::Inner(points));
        }
    }

    shp::Polygon::with_rings(rings)
}

fn ring_points(ring: &LineString<f64>) -> Vec<shp::Point> {
    let mut points: Vec<shp::Point> = ring.0.iter()
        .map(|&Coord { x, y }| shp::Point { x, y })
        .collect();
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if first.x != last.x || first.y != last.y {
            points.push(first);
        }
    }
    points
}

/// Shoelace area; negative for clockwise rings.
fn signed_area(points: &[shp::Point]) -> f64 {
    points.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>() / 2.0
}
