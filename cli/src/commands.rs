pub mod export;
pub mod lists;
pub mod map;
pub mod settlements;

use std::path::Path;

use anyhow::{Context, Result};
use terrageo::client::HttpTransport;
use terrageo::render::{render_svg, Layer, SvgOptions};
use terrageo::summary::{SummaryRow, SummaryTotals};
use terrageo::{format_hectares, Dashboard, FeatureCollection, Notice, ServiceConfig, TerraGeoClient};

use crate::cli::Cli;

/// Build the HTTP-backed dashboard from the global flags.
pub fn dashboard(cli: &Cli) -> Result<Dashboard<HttpTransport>> {
    let mut config = ServiceConfig::from_env().with_base_url(cli.base_url.as_deref());
    if let Some(tolerance) = cli.tolerance {
        config = config.with_tolerance(tolerance);
    }
    log::info!("[cli] using service at {}", config.base_url);

    let transport = HttpTransport::new().context("[cli] Failed to build HTTP client")?;
    Ok(Dashboard::new(TerraGeoClient::new(transport, config)))
}

/// Print notices to stderr.
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let tag = if notice.is_warning() { "warning" } else { "info" };
        eprintln!("[{tag}] {}", notice.message);
    }
}

/// Print the per-category area table.
pub fn print_summary(rows: &[SummaryRow], totals: &SummaryTotals) {
    if rows.is_empty() { return }

    println!("{:<30} {:>18} {:>10} {:>8}", "Categoria", "Área total (ha)", "Qtd.", "%");
    for row in rows {
        println!(
            "{:<30} {:>18} {:>10} {:>7.2}%",
            row.label(),
            format_hectares(row.total_area_ha),
            row.count,
            row.percent_of_total,
        );
    }
    println!(
        "{} categorias, {} propriedades, {} ha",
        totals.categories,
        totals.features,
        format_hectares(totals.total_area_ha),
    );
}

/// Write an SVG preview if a path was given.
pub fn maybe_render(path: Option<&Path>, layers: &[Layer], boundary: Option<&FeatureCollection>, title: &str) -> Result<()> {
    let Some(path) = path else { return Ok(()) };
    if layers.is_empty() {
        log::warn!("[cli] nothing to draw; skipping {}", path.display());
        return Ok(());
    }
    render_svg(path, layers, boundary, title, SvgOptions::default())?;
    println!("Mapa gravado em {}", path.display());
    Ok(())
}
