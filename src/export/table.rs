//! Full attribute table ("ver dados completos") as CSV.

use std::fs::File;
use std::path::Path;

use polars::{frame::DataFrame, io::SerWriter, prelude::{Column, CsvWriter}};
use serde_json::Value;

use crate::error::ExportError;
use crate::feature::Feature;

/// Build a DataFrame with one column per property key, in first-seen order
/// (keys within a feature are sorted).
///
/// A column whose non-null values are all JSON numbers becomes Float64;
/// anything else is a string column. Geometry is dropped.
pub fn attribute_table(features: &[Feature]) -> Result<DataFrame, ExportError> {
    let mut keys: Vec<&str> = Vec::new();
    for feature in features {
        for key in feature.properties.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let columns = keys.into_iter()
        .map(|key| {
            let values = features.iter().map(|f| f.property(key));
            if features.iter().filter_map(|f| f.property(key)).all(Value::is_number) {
                Column::new(key.into(), values.map(|v| v.and_then(Value::as_f64)).collect::<Vec<_>>())
            } else {
                Column::new(key.into(), values.map(|v| v.map(cell_text)).collect::<Vec<_>>())
            }
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Write the attribute table of `features` to a CSV file at `path`.
pub fn write_attribute_csv(features: &[Feature], path: &Path) -> Result<(), ExportError> {
    let mut df = attribute_table(features)?;
    let file = File::create(path)?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use serde_json::{json, Map};

    fn feature(pairs: &[(&str, Value)]) -> Feature {
        let props: Map<String, Value> = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Feature::new(Some(json!({"type": "Point", "coordinates": [0.0, 0.0]})), props)
    }

    #[test]
    fn columns_are_the_union_of_property_keys() {
        let features = vec![
            feature(&[("nome_municipio", json!("Crato")), ("area", json!(12.5))]),
            feature(&[("nome_municipio", json!("Barbalha")), ("categoria", json!("Grande Propriedade"))]),
        ];
        let df = attribute_table(&features).unwrap();
        assert_eq!(df.height(), 2);

        let names: Vec<_> = df.get_column_names().into_iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["area", "nome_municipio", "categoria"]);
        assert_eq!(df.column("area").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("categoria").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn writes_csv_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados.csv");
        let features = vec![feature(&[("nome_municipio", json!("Crato")), ("area", json!("N/A"))])];

        write_attribute_csv(&features, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("area,nome_municipio"));
        assert_eq!(lines.next(), Some("N/A,Crato"));
    }
}
