use std::io::Write;

use anyhow::Result;

use crate::render::{Layer, BOUNDARY_COLOR, BOUNDARY_DASH, BOUNDARY_WEIGHT};

use super::proj::xml_escape;

/// Write the SVG header, including the XML declaration and opening <svg> tag.
pub(crate) fn write_svg_header<W: Write>(writer: &mut W, width: f64, height: f64, bounds: &geo::Rect) -> Result<()> {
    writeln!(writer, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(writer, r##"<svg xmlns="http://www.w3.org/2000/svg"
        width="{width}" height="{height}"
        viewBox="0 0 {width} {height}"
        data-lon-min="{lon_min}" data-lon-max="{lon_max}"
        data-lat-min="{lat_min}" data-lat-max="{lat_max}">"##,
        lon_min = bounds.min().x,
        lon_max = bounds.max().x,
        lat_min = bounds.min().y,
        lat_max = bounds.max().y,
    )?;
    writeln!(writer, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

/// Write SVG styles for parcels and the boundary overlay.
pub(crate) fn write_svg_styles<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, r##"<defs>
<style>
    .feat {{ stroke: #000000; stroke-width: 0.1; fill-opacity: 0.7; }}
    .boundary {{ fill: none; stroke: {stroke}; stroke-width: {BOUNDARY_WEIGHT}; stroke-dasharray: {BOUNDARY_DASH}; }}
    .legend {{ font-family: sans-serif; font-size: 12px; }}
</style>
</defs>"##, stroke = BOUNDARY_COLOR.hex())?;
    Ok(())
}

/// Legend box in the top-left corner: one swatch per layer, with its feature count.
pub(crate) fn write_svg_legend<W: Write>(writer: &mut W, layers: &[Layer], title: &str) -> Result<()> {
    const ROW: f64 = 18.0;
    let height = ROW * (layers.len() as f64 + 1.0) + 8.0;

    writeln!(writer, r##"<g class="legend" transform="translate(12,12)">"##)?;
    writeln!(writer, r##"<rect width="240" height="{height}" fill="#ffffff" fill-opacity="0.9" stroke="#999999"/>"##)?;
    writeln!(writer, r##"<text x="8" y="16" font-weight="bold">{}</text>"##, xml_escape(title))?;
    for (i, layer) in layers.iter().enumerate() {
        let y = ROW * (i as f64 + 1.0) + 6.0;
        writeln!(writer, r##"<rect x="8" y="{y}" width="14" height="14" fill="{}"/>"##, layer.color.hex())?;
        writeln!(writer, r##"<text x="28" y="{}">{} ({})</text>"##, y + 11.0, xml_escape(&layer.label), layer.len())?;
    }
    writeln!(writer, "</g>")?;
    Ok(())
}

/// Write the closing </svg> tag.
pub(crate) fn write_svg_footer<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "</svg>")?;
    Ok(())
}
