//! Shapefile export of parcel collections.

mod polygon;
mod table;

use std::fs;
use std::path::{Path, PathBuf};

use geo::{Geometry, LineString, MultiPolygon, Polygon};
use log::{debug, info, warn};
use serde_json::Value;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};

use crate::category::ALL_CATEGORIES;
use crate::common::{coerce_opt, ensure_dir_exists, zip_files};
use crate::error::ExportError;
use crate::feature::{geometry_kind, parse_geometry, Feature, FeatureCollection};

pub use table::{attribute_table, write_attribute_csv};

/// Output directory used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "output_shapes";

/// Property → attribute column renames, in column order. Names fit the 10-byte dBase limit.
pub const COLUMN_RENAMES: [(&str, &str); 4] = [
    ("nome_municipio", "municipio"),
    ("categoria", "tipo"),
    ("nome_municipio_original", "mun_orig"),
    ("modulo_fiscal", "mod_fisc"),
];

/// Column holding the shapes themselves.
pub const GEOMETRY_COLUMN: &str = "geometry";

const NUMERIC_COLUMN: &str = "mod_fisc";
const CHARACTER_WIDTH: u8 = 254;

const SHAPEFILE_EXTENSIONS: [&str; 5] = ["shp", "shx", "dbf", "cpg", "prj"];

const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// Base filename for a category selector: `propriedades_<slug>`.
///
/// The slug is lowercase with spaces as `_` and `<` as `lt`; "Todas" becomes
/// `todas_categorias`.
pub fn output_stem(label: &str) -> String {
    let slug = if label == ALL_CATEGORIES {
        "todas_categorias".to_string()
    } else {
        label.to_lowercase().replace(' ', "_").replace('<', "lt")
    };
    format!("propriedades_{slug}")
}

/// Attribute columns present in at least one feature, followed by `geometry`.
pub fn export_columns(features: &[Feature]) -> Vec<&'static str> {
    COLUMN_RENAMES.iter()
        .filter(|(key, _)| features.iter().any(|f| f.properties.contains_key(*key)))
        .map(|&(_, column)| column)
        .chain(std::iter::once(GEOMETRY_COLUMN))
        .collect()
}

/// Writes collections as shapefile sets (`.shp .shx .dbf .cpg .prj`).
#[derive(Clone, Debug)]
pub struct ShapefileExporter {
    output_dir: PathBuf,
    zip: bool,
}

impl Default for ShapefileExporter {
    fn default() -> Self { Self::new(DEFAULT_OUTPUT_DIR) }
}

impl ShapefileExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), zip: false }
    }

    /// Also bundle the set into `<stem>.zip`.
    pub fn with_zip(mut self, zip: bool) -> Self {
        self.zip = zip;
        self
    }

    #[inline] pub fn output_dir(&self) -> &Path { &self.output_dir }

    /// Export `collection` under the name derived from `label`; returns the `.shp` path.
    ///
    /// Every geometry must be a Polygon or MultiPolygon. On any error nothing is
    /// left in the output directory: the set is written to a scratch directory
    /// and only moved into place once complete.
    pub fn export(&self, collection: &FeatureCollection, label: &str) -> Result<PathBuf, ExportError> {
        if collection.is_empty() {
            return Err(ExportError::Empty);
        }
        let shapes = collection.features.iter()
            .enumerate()
            .map(|(index, f)| polygonal(index, f))
            .collect::<Result<Vec<_>, _>>()?;

        let columns = export_columns(&collection.features);
        let stem = output_stem(label);

        ensure_dir_exists(&self.output_dir)?;
        let scratch = tempfile::Builder::new()
            .prefix(".export-")
            .tempdir_in(&self.output_dir)?;

        let staged = scratch.path().join(format!("{stem}.shp"));
        write_shapefile(&staged, &collection.features, &shapes, &columns)?;
        fs::write(staged.with_extension("cpg"), "UTF-8")?;
        fs::write(staged.with_extension("prj"), WGS84_PRJ)?;
        debug!("[export] staged {} in {}", stem, scratch.path().display());

        let mut written = Vec::with_capacity(SHAPEFILE_EXTENSIONS.len());
        for ext in SHAPEFILE_EXTENSIONS {
            let target = self.output_dir.join(format!("{stem}.{ext}"));
            if let Err(e) = fs::rename(staged.with_extension(ext), &target) {
                discard(&written);
                return Err(e.into());
            }
            written.push(target);
        }

        if self.zip {
            let archive = self.output_dir.join(format!("{stem}.zip"));
            zip_files(&written, &archive)?;
            debug!("[export] bundled {}", archive.display());
        }

        let shp = self.output_dir.join(format!("{stem}.shp"));
        info!("[export] wrote {} features to {} (columns: {})", collection.len(), shp.display(), columns.join(", "));
        Ok(shp)
    }
}

/// Remove files already moved into place by a set that failed midway.
fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!("[export] could not remove {}: {}", path.display(), e);
        }
    }
}

/// Parse a feature's geometry, rejecting anything that is not polygonal.
///
/// Parts without a closed exterior ring are dropped along with degenerate
/// holes; a geometry left with no parts is rejected.
fn polygonal(index: usize, feature: &Feature) -> Result<MultiPolygon<f64>, ExportError> {
    let schema_error = |found: String| ExportError::Schema { index, found };
    let kind = || feature.geometry.as_ref().map_or("null".to_string(), |g| geometry_kind(g).unwrap_or("unknown").to_string());

    let raw = feature.geometry.as_ref().ok_or_else(|| schema_error(kind()))?;
    let parts = match parse_geometry(raw) {
        Ok(Geometry::Polygon(p)) => vec![p],
        Ok(Geometry::MultiPolygon(mp)) => mp.0,
        _ => return Err(schema_error(kind())),
    };

    let parts: Vec<_> = parts.into_iter().filter_map(valid_part).collect();
    if parts.is_empty() {
        return Err(schema_error(format!("empty {}", kind())));
    }
    Ok(MultiPolygon(parts))
}

fn is_ring(ring: &LineString<f64>) -> bool { ring.0.len() >= 4 }

fn valid_part(polygon: Polygon<f64>) -> Option<Polygon<f64>> {
    if !is_ring(polygon.exterior()) {
        return None;
    }
    let (exterior, interiors) = polygon.into_inner();
    Some(Polygon::new(exterior, interiors.into_iter().filter(is_ring).collect()))
}

fn field_name(name: &str) -> Result<FieldName, ExportError> {
    FieldName::try_from(name).map_err(|e| ExportError::Field(format!("{name}: {e:?}")))
}

fn write_shapefile(path: &Path, features: &[Feature], shapes: &[MultiPolygon<f64>], columns: &[&str]) -> Result<(), ExportError> {
    let renames: Vec<(&str, &str)> = COLUMN_RENAMES.iter()
        .copied()
        .filter(|(_, column)| columns.contains(column))
        .collect();

    let mut table = TableWriterBuilder::new();
    for &(_, column) in &renames {
        table = if column == NUMERIC_COLUMN {
            table.add_numeric_field(field_name(column)?, 18, 6)
        } else {
            table.add_character_field(field_name(column)?, CHARACTER_WIDTH)
        };
    }

    let mut writer = shapefile::Writer::from_path(path, table)?;
    for (feature, shape) in features.iter().zip(shapes) {
        let mut record = Record::default();
        for &(key, column) in &renames {
            let value = if column == NUMERIC_COLUMN {
                FieldValue::Numeric(coerce_opt(feature.property(key)))
            } else {
                FieldValue::Character(feature.property(key).map(character_value))
            };
            record.insert(column.to_string(), value);
        }
        writer.write_shape_and_record(&polygon::to_shp_polygon(shape), &record)?;
    }
    drop(writer);
    Ok(())
}

/// Text for a character column, cut to the field width on a char boundary.
fn character_value(value: &Value) -> String {
    let mut text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let width = usize::from(CHARACTER_WIDTH);
    if text.len() > width {
        let cut = (0..=width).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
        text.truncate(cut);
    }
    text
}
