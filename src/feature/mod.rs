mod collection;
mod geometry;

pub use collection::{Feature, FeatureCollection, WGS84_EPSG};
pub use geometry::{geometry_kind, geometry_to_geojson, parse_geometry, GeometryError};
