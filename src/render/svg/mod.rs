//! Static SVG map preview.

mod proj;
mod writer;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geo::{BoundingRect, Coord, Geometry, MultiPolygon, Rect};

use crate::feature::{parse_geometry, Feature, FeatureCollection};
use crate::render::{tooltip_lines, Layer, BOUNDARY_TOOLTIP};

use proj::{multipolygon_to_path, xml_escape, Projection};
use writer::{write_svg_footer, write_svg_header, write_svg_legend, write_svg_styles};

/// Output size of the preview, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgOptions {
    pub width: f64,
    pub margin: f64,
}

impl Default for SvgOptions {
    fn default() -> Self { Self { width: 1200.0, margin: 10.0 } }
}

/// Write an SVG preview of `layers` (and the dashed `boundary` overlay) to `path`.
pub fn render_svg(path: &Path, layers: &[Layer], boundary: Option<&FeatureCollection>, title: &str, options: SvgOptions) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[render::svg] Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_svg(&mut writer, layers, boundary, title, options)?;
    writer.flush()
        .with_context(|| format!("[render::svg] Failed to write {}", path.display()))
}

/// Write an SVG preview to any writer.
///
/// Each feature is a filled path carrying its tooltip as `<title>`. Features
/// without polygonal geometry are not drawn.
pub fn write_svg<W: Write>(writer: &mut W, layers: &[Layer], boundary: Option<&FeatureCollection>, title: &str, options: SvgOptions) -> Result<()> {
    let shapes: Vec<Vec<(&Feature, MultiPolygon<f64>)>> = layers.iter()
        .map(|layer| polygonal(&layer.features))
        .collect();
    let outlines = boundary.map(|fc| polygonal(&fc.features)).unwrap_or_default();

    let bounds = shapes.iter().flatten()
        .chain(&outlines)
        .filter_map(|(_, mp)| mp.bounding_rect())
        .reduce(union)
        .ok_or_else(|| anyhow!("[render::svg] Could not determine bounds; nothing to draw."))?;

    let SvgOptions { width, margin } = options;
    let scale = (width - 2.0 * margin) / bounds.width().max(1e-9);
    let height = bounds.height() * scale + 2.0 * margin;

    // lon/lat -> SVG coords (Y down)
    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = margin + (coord.x - bounds.min().x) * scale;
        let y = margin + (bounds.max().y - coord.y) * scale;
        (x, y)
    };

    write_svg_header(writer, width, height, &bounds)?;
    write_svg_styles(writer)?;

    for (layer, features) in layers.iter().zip(&shapes) {
        writeln!(writer, r#"<g class="layer" data-label="{}">"#, xml_escape(&layer.label))?;
        for (feature, shape) in features {
            draw_feature(writer, shape, &project, &layer.color.hex(), &tooltip_lines(feature, layer.tooltip))?;
        }
        writeln!(writer, "</g>")?;
    }

    for (feature, shape) in &outlines {
        writeln!(
            writer,
            r#"<path class="boundary" d="{}"><title>{}</title></path>"#,
            multipolygon_to_path(shape, &project),
            xml_escape(&tooltip_lines(feature, BOUNDARY_TOOLTIP).join("\n")),
        )?;
    }

    write_svg_legend(writer, layers, title)?;
    write_svg_footer(writer)?;
    Ok(())
}

fn draw_feature<W: Write>(writer: &mut W, shape: &MultiPolygon<f64>, project: &Projection, fill: &str, tooltip: &[String]) -> Result<()> {
    writeln!(
        writer,
        r#"<path class="feat" fill-rule="evenodd" style="fill:{fill}" d="{}"><title>{}</title></path>"#,
        multipolygon_to_path(shape, project),
        xml_escape(&tooltip.join("\n")),
    )?;
    Ok(())
}

fn polygonal(features: &[Feature]) -> Vec<(&Feature, MultiPolygon<f64>)> {
    features.iter()
        .filter_map(|f| {
            let shape = match parse_geometry(f.geometry.as_ref()?).ok()? {
                Geometry::Polygon(p) => MultiPolygon(vec![p]),
                Geometry::MultiPolygon(mp) => mp,
                _ => return None,
            };
            Some((f, shape))
        })
        .collect()
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::category_layers;
    use serde_json::{json, Map};

    fn parcel(category: &str, dx: f64) -> Feature {
        let mut props = Map::new();
        props.insert("categoria".into(), json!(category));
        props.insert("nome_municipio".into(), json!("Iguatu"));
        props.insert("area".into(), json!(42.0));
        let ring = json!([[-39.0 + dx, -6.0], [-38.9 + dx, -6.0], [-38.9 + dx, -5.9], [-39.0 + dx, -6.0]]);
        Feature::new(Some(json!({"type": "Polygon", "coordinates": [ring]})), props)
    }

    #[test]
    fn draws_layers_boundary_and_legend() {
        let fc: FeatureCollection = vec![
            parcel("Grande Propriedade", 0.0),
            parcel("Pequena Propriedade < 1 MF", 0.2),
        ].into_iter().collect();
        let boundary: FeatureCollection = vec![parcel("x", 0.1)].into_iter().collect();

        let mut out = Vec::new();
        write_svg(&mut out, &category_layers(&fc), Some(&boundary), "Iguatu", SvgOptions::default()).unwrap();
        let svg = String::from_utf8(out).unwrap();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="feat""#).count(), 2);
        assert_eq!(svg.matches(r#"class="boundary""#).count(), 1);
        assert!(svg.contains("fill:#bd0026"));
        assert!(svg.contains("stroke: #003366"));
        assert!(svg.contains("Município: Iguatu"));
        assert!(svg.contains("Pequena Propriedade &lt; 1 MF (1)"));
    }

    #[test]
    fn nothing_drawable_is_an_error() {
        let mut out = Vec::new();
        assert!(write_svg(&mut out, &[], None, "vazio", SvgOptions::default()).is_err());
    }
}
