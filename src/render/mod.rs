//! What a map view needs: colored layers, tooltips, the initial center, and a static SVG preview.

mod svg;

use geo::{Geometry, Point};

use crate::category::{settlement_color, Category, Rgb, SettlementKind, SETTLEMENT_KIND_KEY};
use crate::common::display_value;
use crate::feature::{parse_geometry, Feature, FeatureCollection};

pub use svg::{render_svg, write_svg, SvgOptions};

/// `(lat, lon)` used when a collection has no polygonal geometry.
pub const DEFAULT_CENTER: (f64, f64) = (-5.2, -39.0);

/// Municipality boundary overlay: dashed, unfilled.
pub const BOUNDARY_COLOR: Rgb = Rgb::new(0x00, 0x33, 0x66);
pub const BOUNDARY_WEIGHT: f64 = 2.0;
pub const BOUNDARY_DASH: &str = "5,5";

/// `(property, alias)` pairs shown when hovering a feature.
pub type TooltipFields = &'static [(&'static str, &'static str)];

pub const PARCEL_TOOLTIP: TooltipFields = &[
    ("nome_municipio", "Município:"),
    ("area", "Área (ha):"),
    ("categoria", "Categoria:"),
];

pub const BOUNDARY_TOOLTIP: TooltipFields = &[("nome_municipio", "Município:")];

pub const SETTLEMENT_TOOLTIP: TooltipFields = &[
    ("cd_sipra", "Cd_SIPRA:"),
    ("tipo_assentamento", "Tipo:"),
    ("nome_assentamento", "Assentamento:"),
    ("nome_municipio_original", "Município:"),
    ("num_familias", "Famílias:"),
    ("forma_obtecao", "Forma de Obtenção:"),
    ("area", "Área (ha):"),
    ("perimetro", "Perímetro (km):"),
];

/// A group of features drawn with one fill color and one legend entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub label: String,
    pub color: Rgb,
    pub tooltip: TooltipFields,
    pub features: Vec<Feature>,
}

impl Layer {
    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }
}

/// One layer per category in enumeration order; unknown or missing values land in "Sem Classificação".
pub fn category_layers(collection: &FeatureCollection) -> Vec<Layer> {
    let mut buckets: Vec<Vec<Feature>> = vec![Vec::new(); Category::ALL.len()];
    for feature in &collection.features {
        buckets[Category::of_feature(feature).rank()].push(feature.clone());
    }

    Category::ALL.into_iter()
        .zip(buckets)
        .filter(|(_, features)| !features.is_empty())
        .map(|(category, features)| Layer {
            label: category.label().to_string(),
            color: category.color(),
            tooltip: PARCEL_TOOLTIP,
            features,
        })
        .collect()
}

/// Settlements split by kind; values matching neither kind form an "Outros" layer.
pub fn settlement_layers(collection: &FeatureCollection) -> Vec<Layer> {
    let mut state = Vec::new();
    let mut federal = Vec::new();
    let mut other = Vec::new();
    for feature in &collection.features {
        match feature.property_str(SETTLEMENT_KIND_KEY).and_then(SettlementKind::parse) {
            Some(SettlementKind::State) => state.push(feature.clone()),
            Some(SettlementKind::Federal) => federal.push(feature.clone()),
            None => other.push(feature.clone()),
        }
    }

    [
        (SettlementKind::State.label(), SettlementKind::State.color(), state),
        (SettlementKind::Federal.label(), SettlementKind::Federal.color(), federal),
        ("Outros", settlement_color(None), other),
    ]
    .into_iter()
    .filter(|(_, _, features)| !features.is_empty())
    .map(|(label, color, features)| Layer { label: label.to_string(), color, tooltip: SETTLEMENT_TOOLTIP, features })
    .collect()
}

/// First vertex of the first Polygon/MultiPolygon as `(lat, lon)`, or [`DEFAULT_CENTER`].
pub fn map_center(collection: &FeatureCollection) -> (f64, f64) {
    collection.features.iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(|raw| {
            let first = match parse_geometry(raw).ok()? {
                Geometry::Polygon(p) => p.exterior().0.first().copied(),
                Geometry::MultiPolygon(mp) => mp.0.first().and_then(|p| p.exterior().0.first().copied()),
                _ => None,
            }?;
            let p = Point::from(first);
            Some((p.y(), p.x()))
        })
        .unwrap_or(DEFAULT_CENTER)
}

/// Tooltip text, one `alias value` line per field.
///
/// Missing, blank, `nan`, `none` and `null` values read "Não Disponível".
pub fn tooltip_lines(feature: &Feature, fields: TooltipFields) -> Vec<String> {
    fields.iter()
        .map(|(key, alias)| format!("{alias} {}", display_value(feature.properties.get(*key))))
        .collect()
}

/// Replace every settlement tooltip field with its display text, filling gaps.
pub fn normalize_settlement(feature: &mut Feature) {
    for (key, _) in SETTLEMENT_TOOLTIP {
        let text = display_value(feature.properties.get(*key));
        feature.properties.insert(key.to_string(), text.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CATEGORY_KEY;
    use crate::common::NOT_AVAILABLE;
    use serde_json::{json, Map, Value};

    fn feature(key: &str, value: Option<Value>, geometry: Option<Value>) -> Feature {
        let mut props = Map::new();
        if let Some(v) = value { props.insert(key.into(), v); }
        Feature::new(geometry, props)
    }

    #[test]
    fn layers_follow_enumeration_order_and_skip_empty() {
        let fc: FeatureCollection = vec![
            feature(CATEGORY_KEY, Some(json!("Grande Propriedade")), None),
            feature(CATEGORY_KEY, None, None),
            feature(CATEGORY_KEY, Some(json!("Pequena Propriedade < 1 MF")), None),
            feature(CATEGORY_KEY, Some(json!("Latifúndio")), None),
        ].into_iter().collect();

        let layers = category_layers(&fc);
        let labels: Vec<_> = layers.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["Pequena Propriedade < 1 MF", "Grande Propriedade", "Sem Classificação"]);
        assert_eq!(layers[2].len(), 2);
        assert_eq!(layers[1].color.hex(), "#bd0026");
    }

    #[test]
    fn settlements_group_by_kind() {
        let fc: FeatureCollection = vec![
            feature(SETTLEMENT_KIND_KEY, Some(json!("Federal")), None),
            feature(SETTLEMENT_KIND_KEY, Some(json!("estadual")), None),
            feature(SETTLEMENT_KIND_KEY, Some(json!("federal")), None),
        ].into_iter().collect();

        let layers = settlement_layers(&fc);
        assert_eq!(layers.len(), 2);
        assert_eq!((layers[0].label.as_str(), layers[0].len()), ("Estadual", 1));
        assert_eq!((layers[1].label.as_str(), layers[1].len()), ("Federal", 2));
    }

    #[test]
    fn center_is_first_polygon_vertex() {
        let point = json!({"type": "Point", "coordinates": [-40.0, -3.0]});
        let poly = json!({"type": "MultiPolygon", "coordinates": [[[[-38.5, -4.1], [-38.4, -4.1], [-38.4, -4.0], [-38.5, -4.1]]]]});
        let fc: FeatureCollection = vec![
            feature("x", None, Some(point)),
            feature("x", None, Some(poly)),
        ].into_iter().collect();

        assert_eq!(map_center(&fc), (-4.1, -38.5));
        assert_eq!(map_center(&FeatureCollection::default()), DEFAULT_CENTER);
    }

    #[test]
    fn settlement_tooltips_fill_missing_values() {
        let mut f = feature("nome_assentamento", Some(json!("Lagoa Verde")), None);
        f.properties.insert("num_familias".into(), json!("nan"));
        f.properties.insert("area".into(), json!(120.5));

        let lines = tooltip_lines(&f, SETTLEMENT_TOOLTIP);
        assert_eq!(lines[2], "Assentamento: Lagoa Verde");
        assert_eq!(lines[4], format!("Famílias: {NOT_AVAILABLE}"));
        assert_eq!(lines[6], "Área (ha): 120.5");

        normalize_settlement(&mut f);
        assert_eq!(f.property_str("cd_sipra"), Some(NOT_AVAILABLE));
        assert_eq!(f.properties.len(), SETTLEMENT_TOOLTIP.len());
    }
}
