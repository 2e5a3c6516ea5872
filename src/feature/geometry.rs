use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("geometry is not a JSON object")]
    NotAnObject,
    #[error("unsupported geometry type {0:?}")]
    UnsupportedType(String),
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(&'static str),
}

/// Read the `type` member of a raw GeoJSON geometry.
#[inline]
pub fn geometry_kind(geometry: &Value) -> Option<&str> {
    geometry.get("type").and_then(Value::as_str)
}

/// Parse a raw GeoJSON geometry into a `geo::Geometry`.
pub fn parse_geometry(geometry: &Value) -> Result<Geometry<f64>, GeometryError> {
    let kind = geometry_kind(geometry).ok_or(GeometryError::NotAnObject)?;
    let coords = geometry.get("coordinates")
        .ok_or(GeometryError::InvalidCoordinates("missing coordinates"))?;

    Ok(match kind {
        "Point" => Geometry::Point(Point(parse_coord(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            array(coords)?.iter().map(|c| parse_coord(c).map(Point)).collect::<Result<_, _>>()?
        )),
        "LineString" => Geometry::LineString(parse_line(coords)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString(
            array(coords)?.iter().map(parse_line).collect::<Result<_, _>>()?
        )),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
            array(coords)?.iter().map(parse_polygon).collect::<Result<_, _>>()?
        )),
        other => return Err(GeometryError::UnsupportedType(other.to_string())),
    })
}

/// Write a polygonal geometry back as a raw GeoJSON geometry.
/// Returns `None` for non-polygonal input.
pub fn geometry_to_geojson(geometry: &Geometry<f64>) -> Option<Value> {
    match geometry {
        Geometry::Polygon(polygon) => Some(json!({
            "type": "Polygon",
            "coordinates": polygon_coords(polygon),
        })),
        Geometry::MultiPolygon(mp) => Some(json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_coords).collect::<Vec<_>>(),
        })),
        _ => None,
    }
}

fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

#[inline]
fn array(value: &Value) -> Result<&Vec<Value>, GeometryError> {
    value.as_array().ok_or(GeometryError::InvalidCoordinates("expected an array"))
}

/// Parse `[x, y]` (extra ordinates such as altitude are ignored).
fn parse_coord(value: &Value) -> Result<Coord<f64>, GeometryError> {
    let pair = array(value)?;
    if pair.len() < 2 {
        return Err(GeometryError::InvalidCoordinates("position needs at least two numbers"));
    }
    let x = pair[0].as_f64().ok_or(GeometryError::InvalidCoordinates("x must be a number"))?;
    let y = pair[1].as_f64().ok_or(GeometryError::InvalidCoordinates("y must be a number"))?;
    Ok(Coord { x, y })
}

fn parse_line(value: &Value) -> Result<LineString<f64>, GeometryError> {
    Ok(LineString(array(value)?.iter().map(parse_coord).collect::<Result<_, _>>()?))
}

/// Parse a ring, closing it if the payload left it open.
fn parse_ring(value: &Value) -> Result<LineString<f64>, GeometryError> {
    let mut ring = parse_line(value)?;
    ring.close();
    Ok(ring)
}

/// Parse `[exterior, hole, hole, ...]`.
fn parse_polygon(value: &Value) -> Result<Polygon<f64>, GeometryError> {
    let rings = array(value)?;
    let Some((exterior, holes)) = rings.split_first() else {
        return Ok(Polygon::new(LineString(Vec::new()), Vec::new()));
    };
    Ok(Polygon::new(
        parse_ring(exterior)?,
        holes.iter().map(parse_ring).collect::<Result<_, _>>()?,
    ))
}
